//! Bounded retries with exponential backoff.
//!
//! A failed attempt is retried only when the caller classifies its error as
//! transient. Delays double each time: with the default policy the second
//! attempt starts 2s after the first fails and the third 4s after the second.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// How many times to try and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(2))
    }
}

impl RetryPolicy {
    /// `max_attempts` is clamped to at least one.
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before 0-indexed attempt `attempt` (`attempt >= 1`):
    /// `base_delay * 2^(attempt - 1)`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor)
    }
}

/// Blocks the current thread between attempts.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Sleeps for real.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Why a retried operation gave up.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RetryError<E: fmt::Display> {
    /// Every attempt failed with a transient error
    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: E },

    /// A non-transient error stopped the loop
    #[error("failed on attempt {attempt}: {error}")]
    Fatal { attempt: u32, error: E },
}

/// Run `op` until it succeeds, fails fatally, or the policy is exhausted.
///
/// `op` receives the 0-indexed attempt number.
pub fn retry<T, E, F, P>(
    policy: &RetryPolicy,
    sleeper: &impl Sleeper,
    is_transient: P,
    mut op: F,
) -> Result<T, RetryError<E>>
where
    E: fmt::Display,
    F: FnMut(u32) -> Result<T, E>,
    P: Fn(&E) -> bool,
{
    let max = policy.max_attempts();
    let mut attempt = 0;

    loop {
        let error = match op(attempt) {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        if !is_transient(&error) {
            log::error!("Unexpected error on attempt {}: {}", attempt + 1, error);
            return Err(RetryError::Fatal {
                attempt: attempt + 1,
                error,
            });
        }

        if attempt + 1 >= max {
            log::error!("{} after {} attempts", error, max);
            return Err(RetryError::Exhausted {
                attempts: max,
                last: error,
            });
        }

        attempt += 1;
        let delay = policy.delay_for(attempt);
        log::warn!(
            "{} on attempt {}/{}. Retrying in {}s...",
            error,
            attempt,
            max,
            delay.as_secs_f64()
        );
        sleeper.sleep(delay);
    }
}

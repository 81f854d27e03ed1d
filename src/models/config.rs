//! Application configuration structures.

use std::fs;
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::pipeline::RetryPolicy;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Browser launch and page-load settings
    #[serde(default)]
    pub browser: BrowserConfig,

    /// Retry policy for whole fetch attempts
    #[serde(default)]
    pub retry: RetryConfig,

    /// Post discovery and expansion settings
    #[serde(default)]
    pub collector: CollectorConfig,

    /// Batch scraping settings
    #[serde(default)]
    pub scrape: ScrapeConfig,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.browser.user_agent.trim().is_empty() {
            return Err(AppError::validation("browser.user_agent is empty"));
        }
        if self.browser.navigation_timeout_secs == 0 {
            return Err(AppError::validation(
                "browser.navigation_timeout_secs must be > 0",
            ));
        }
        if self.browser.selector_timeout_secs == 0 {
            return Err(AppError::validation(
                "browser.selector_timeout_secs must be > 0",
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(AppError::validation("retry.max_attempts must be >= 1"));
        }
        if self.collector.post_selector.trim().is_empty() {
            return Err(AppError::validation("collector.post_selector is empty"));
        }
        scraper::Selector::parse(&self.collector.post_selector)
            .map_err(|e| AppError::selector(&self.collector.post_selector, format!("{e:?}")))?;
        if self.collector.max_posts == 0 {
            return Err(AppError::validation("collector.max_posts must be > 0"));
        }
        if !(0.0..=1.0).contains(&self.collector.scroll_fraction) {
            return Err(AppError::validation(
                "collector.scroll_fraction must be between 0 and 1",
            ));
        }
        if self.collector.header_chars == 0 {
            return Err(AppError::validation("collector.header_chars must be > 0"));
        }
        if self.scrape.max_concurrent == 0 {
            return Err(AppError::validation("scrape.max_concurrent must be > 0"));
        }
        if let Err(e) = self.scrape.timezone.parse::<Tz>() {
            return Err(AppError::validation(format!(
                "scrape.timezone '{}' is not an IANA zone: {}",
                self.scrape.timezone, e
            )));
        }
        Ok(())
    }
}

/// Browser launch and page-load settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// User-Agent reported by the browser
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Run without a visible window
    #[serde(default = "defaults::headless")]
    pub headless: bool,

    /// Keep Chrome's sandbox enabled
    #[serde(default)]
    pub sandbox: bool,

    /// Viewport width and height in pixels
    #[serde(default = "defaults::window_size")]
    pub window_size: (u32, u32),

    /// Budget for page navigation
    #[serde(default = "defaults::navigation_timeout")]
    pub navigation_timeout_secs: u64,

    /// Budget for the first post element to appear
    #[serde(default = "defaults::selector_timeout")]
    pub selector_timeout_secs: u64,

    /// Extra command-line switches passed to Chrome
    #[serde(default = "defaults::launch_args")]
    pub launch_args: Vec<String>,
}

impl BrowserConfig {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn selector_timeout(&self) -> Duration {
        Duration::from_secs(self.selector_timeout_secs)
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            headless: defaults::headless(),
            sandbox: false,
            window_size: defaults::window_size(),
            navigation_timeout_secs: defaults::navigation_timeout(),
            selector_timeout_secs: defaults::selector_timeout(),
            launch_args: defaults::launch_args(),
        }
    }
}

/// Retry settings for whole fetch attempts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts, including the first one
    #[serde(default = "defaults::max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry; doubles for each further retry
    #[serde(default = "defaults::base_delay")]
    pub base_delay_secs: u64,
}

impl RetryConfig {
    /// Build the immutable policy used by the orchestrator.
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_secs(self.base_delay_secs))
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: defaults::max_attempts(),
            base_delay_secs: defaults::base_delay(),
        }
    }
}

/// Post discovery, expansion and classification settings.
///
/// The selectors are the only contract with the upstream page structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Selector matching both top-level posts and nested replies
    #[serde(default = "defaults::post_selector")]
    pub post_selector: String,

    /// Visible text of the "see more" control inside a truncated post
    #[serde(default = "defaults::expand_labels")]
    pub expand_labels: Vec<String>,

    /// Number of top-level posts expanded and examined
    #[serde(default = "defaults::max_posts")]
    pub max_posts: usize,

    /// How far down the page to scroll before querying, as a fraction of its height
    #[serde(default = "defaults::scroll_fraction")]
    pub scroll_fraction: f64,

    /// Pause after scrolling
    #[serde(default = "defaults::scroll_settle")]
    pub scroll_settle_ms: u64,

    /// Pause after expanding a post
    #[serde(default = "defaults::expand_settle")]
    pub expand_settle_ms: u64,

    /// Leading characters of a post searched for its relative timestamp
    #[serde(default = "defaults::header_chars")]
    pub header_chars: usize,
}

impl CollectorConfig {
    pub fn scroll_settle(&self) -> Duration {
        Duration::from_millis(self.scroll_settle_ms)
    }

    pub fn expand_settle(&self) -> Duration {
        Duration::from_millis(self.expand_settle_ms)
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            post_selector: defaults::post_selector(),
            expand_labels: defaults::expand_labels(),
            max_posts: defaults::max_posts(),
            scroll_fraction: defaults::scroll_fraction(),
            scroll_settle_ms: defaults::scroll_settle(),
            expand_settle_ms: defaults::expand_settle(),
            header_chars: defaults::header_chars(),
        }
    }
}

/// Batch scraping settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Locations scraped at the same time (each one drives its own browser)
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// IANA zone the businesses keep their calendar in
    #[serde(default = "defaults::timezone")]
    pub timezone: String,
}

impl ScrapeConfig {
    /// The business time zone, falling back to the default zone when the
    /// configured name is unknown.
    pub fn zone(&self) -> Tz {
        self.timezone.parse().unwrap_or_else(|e| {
            log::warn!(
                "Unknown timezone '{}' ({}), using {}",
                self.timezone,
                e,
                defaults::TIMEZONE
            );
            defaults::TIMEZONE
        })
    }

    /// Current time in the business zone.
    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.zone()).fixed_offset()
    }

    /// Today's calendar date for the businesses being scraped.
    pub fn today(&self) -> NaiveDate {
        self.date_at(Utc::now())
    }

    /// Business calendar date at `instant`.
    pub fn date_at(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.zone()).date_naive()
    }
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            max_concurrent: defaults::max_concurrent(),
            timezone: defaults::timezone(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    // Browser defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/137.0.0.0 Safari/537.36"
            .into()
    }
    pub fn headless() -> bool {
        true
    }
    pub fn window_size() -> (u32, u32) {
        (1920, 1080)
    }
    pub fn navigation_timeout() -> u64 {
        60
    }
    pub fn selector_timeout() -> u64 {
        30
    }
    pub fn launch_args() -> Vec<String> {
        vec![
            "--disable-gpu".into(),
            "--disable-dev-shm-usage".into(),
            "--disable-blink-features=AutomationControlled".into(),
            "--disable-extensions".into(),
            "--disable-infobars".into(),
        ]
    }

    // Retry defaults
    pub fn max_attempts() -> u32 {
        3
    }
    pub fn base_delay() -> u64 {
        2
    }

    // Collector defaults
    pub fn post_selector() -> String {
        r#"[role="article"]"#.into()
    }
    pub fn expand_labels() -> Vec<String> {
        vec!["See more".into()]
    }
    pub fn max_posts() -> usize {
        10
    }
    pub fn scroll_fraction() -> f64 {
        0.5
    }
    pub fn scroll_settle() -> u64 {
        1000
    }
    pub fn expand_settle() -> u64 {
        500
    }
    pub fn header_chars() -> usize {
        200
    }

    // Scrape defaults
    pub fn max_concurrent() -> usize {
        1
    }

    pub const TIMEZONE: chrono_tz::Tz = chrono_tz::America::Chicago;
    pub fn timezone() -> String {
        TIMEZONE.name().into()
    }

    // Logging defaults
    pub fn log_level() -> String {
        "info".into()
    }
}

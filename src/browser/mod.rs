//! Scripted browser abstraction.
//!
//! The pipeline only talks to these traits, so the same collector runs
//! against a live Chrome tab, a saved HTML snapshot, or a test double.
//!
//! - `chrome`: headless Chrome driver (feature `chrome`)
//! - `snapshot`: static HTML page parsed with `scraper`
//! - `dom`: ancestor walk shared by the tree-backed implementations

#[cfg(feature = "chrome")]
pub mod chrome;
pub mod dom;
#[cfg(test)]
pub(crate) mod mock;
pub mod snapshot;

use std::ops::{Deref, DerefMut};
use std::time::Duration;

use crate::error::BrowserError;

#[cfg(feature = "chrome")]
pub use chrome::ChromeLauncher;
pub use dom::{AncestorWalk, has_ancestor_matching};
pub use snapshot::{SnapshotFactory, SnapshotSession};

/// Starts one browser session per fetch attempt.
pub trait SessionFactory {
    type Session: BrowserSession;

    /// Launch a fresh browser with a single page.
    fn launch(&self) -> Result<Self::Session, BrowserError>;
}

/// A browser driving exactly one page.
pub trait BrowserSession {
    /// Handle to a post element, valid while the session is alive.
    type Post<'a>: PostHandle
    where
        Self: 'a;

    /// Navigate and wait for the page to settle, bounded by `timeout`.
    fn goto(&self, url: &str, timeout: Duration) -> Result<(), BrowserError>;

    /// Wait until at least one element matches `selector`.
    fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<(), BrowserError>;

    /// Scroll to `fraction` of the document height.
    fn scroll_to_fraction(&self, fraction: f64) -> Result<(), BrowserError>;

    /// Give the page time to render.
    fn pause(&self, duration: Duration);

    /// All elements matching `selector`, in document order.
    fn query_all(&self, selector: &str) -> Result<Vec<Self::Post<'_>>, BrowserError>;

    /// Release the page and the browser process.
    fn close(&mut self) -> Result<(), BrowserError>;
}

/// One post-role element on the page.
pub trait PostHandle {
    /// Whether an ancestor (other than the element itself) matches `post_selector`.
    fn is_nested(&self, post_selector: &str) -> Result<bool, BrowserError>;

    /// Click a visible expansion control belonging to this element.
    ///
    /// Controls whose closest `post_selector` match is a nested element
    /// (a comment) are skipped. Returns `true` when a control was activated.
    fn expand(&self, post_selector: &str, labels: &[String]) -> Result<bool, BrowserError>;

    /// Rendered text of the element.
    fn inner_text(&self) -> Result<String, BrowserError>;
}

/// Closes the wrapped session when dropped, on every exit path.
///
/// Close failures are logged and swallowed.
pub struct SessionGuard<S: BrowserSession> {
    session: S,
}

impl<S: BrowserSession> SessionGuard<S> {
    pub fn new(session: S) -> Self {
        Self { session }
    }
}

impl<S: BrowserSession> Deref for SessionGuard<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.session
    }
}

impl<S: BrowserSession> DerefMut for SessionGuard<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.session
    }
}

impl<S: BrowserSession> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        if let Err(e) = self.session.close() {
            log::warn!("Failed to close browser session: {}", e);
        }
    }
}

// src/services/collector.rs

//! Post collection from a loaded social page.
//!
//! Loads the page, keeps top-level posts only, expands truncated posts and
//! reads each candidate's text exactly once.

use crate::browser::{BrowserSession, PostHandle};
use crate::error::BrowserError;
use crate::models::{BrowserConfig, CollectorConfig, Post};

/// Collects the leading top-level posts of a page.
#[derive(Debug, Clone)]
pub struct PostCollector {
    browser: BrowserConfig,
    collector: CollectorConfig,
}

impl PostCollector {
    pub fn new(browser: BrowserConfig, collector: CollectorConfig) -> Self {
        Self { browser, collector }
    }

    /// Load `url` in `session` and return the readable candidate posts in
    /// page order.
    ///
    /// Only the navigation and the wait for the first post can fail the
    /// attempt; everything after that degrades per post.
    pub fn collect<S: BrowserSession>(
        &self,
        session: &S,
        url: &str,
    ) -> Result<Vec<Post>, BrowserError> {
        let selector = &self.collector.post_selector;

        log::debug!(
            "Loading {} (timeout: {}s)",
            url,
            self.browser.navigation_timeout_secs
        );
        session.goto(url, self.browser.navigation_timeout())?;

        log::debug!(
            "Waiting for posts (timeout: {}s)",
            self.browser.selector_timeout_secs
        );
        session.wait_for_selector(selector, self.browser.selector_timeout())?;

        match session.scroll_to_fraction(self.collector.scroll_fraction) {
            Ok(()) => session.pause(self.collector.scroll_settle()),
            Err(e) => log::debug!("Scroll failed, continuing: {}", e),
        }

        let elements = session.query_all(selector)?;
        let total = elements.len();
        let top_level: Vec<_> = elements
            .into_iter()
            .filter(|post| match post.is_nested(selector) {
                Ok(nested) => !nested,
                Err(e) => {
                    log::debug!("Nesting check failed, keeping post: {}", e);
                    true
                }
            })
            .take(self.collector.max_posts)
            .collect();
        log::debug!("Found {} elements, {} top-level posts", total, top_level.len());

        for (index, post) in top_level.iter().enumerate() {
            match post.expand(selector, &self.collector.expand_labels) {
                Ok(true) => {
                    log::debug!("Expanded post {}", index);
                    session.pause(self.collector.expand_settle());
                }
                Ok(false) => {}
                Err(e) => log::debug!("Could not expand post {}: {}", index, e),
            }
        }

        let mut posts = Vec::with_capacity(top_level.len());
        for (index, post) in top_level.iter().enumerate() {
            match post.inner_text() {
                Ok(text) if text.trim().is_empty() => {
                    log::debug!("Post {} has no text, skipping", index);
                }
                Ok(text) => posts.push(Post::new(text, index)),
                Err(e) => log::debug!("Failed to read post {}: {}", index, e),
            }
        }

        Ok(posts)
    }
}

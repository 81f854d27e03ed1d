//! Retry-protected fetch of one social page.
//!
//! Each attempt launches its own browser session, collects the leading posts
//! and looks for today's announcement. Browser hiccups retry the whole attempt;
//! anything else ends the fetch.

use crate::browser::{SessionFactory, SessionGuard};
use crate::error::BrowserError;
use crate::models::{Config, ScrapeOutcome};
use crate::pipeline::retry::{RetryError, RetryPolicy, Sleeper, ThreadSleeper, retry};
use crate::services::{
    AnnouncementFinder, FlavorExtractor, Match, PostCollector, RecencyClassifier,
};
use crate::utils::parse_page_url;

/// Drives fetch attempts for a page URL.
pub struct FetchOrchestrator<F, Z = ThreadSleeper> {
    factory: F,
    sleeper: Z,
    policy: RetryPolicy,
    collector: PostCollector,
    finder: AnnouncementFinder,
}

impl<F: SessionFactory> FetchOrchestrator<F> {
    pub fn new(factory: F, config: &Config) -> Self {
        Self {
            factory,
            sleeper: ThreadSleeper,
            policy: config.retry.policy(),
            collector: PostCollector::new(config.browser.clone(), config.collector.clone()),
            finder: AnnouncementFinder::new(
                RecencyClassifier::new(config.collector.header_chars),
                FlavorExtractor::new(),
            ),
        }
    }
}

impl<F: SessionFactory, Z: Sleeper> FetchOrchestrator<F, Z> {
    /// Replace how the orchestrator waits between attempts.
    pub fn with_sleeper<Y: Sleeper>(self, sleeper: Y) -> FetchOrchestrator<F, Y> {
        FetchOrchestrator {
            factory: self.factory,
            sleeper,
            policy: self.policy,
            collector: self.collector,
            finder: self.finder,
        }
    }

    /// Text of today's flavor post, or `None` for any failure or miss.
    pub fn fetch_flavor_post(&self, url: &str) -> Option<String> {
        self.run(url).ok().flatten().map(|found| found.post.text)
    }

    /// Fetch `url` and report what happened.
    pub fn resolve(&self, url: &str) -> ScrapeOutcome {
        match self.run(url) {
            Ok(Some(found)) => ScrapeOutcome::Found(found.announcement),
            Ok(None) => ScrapeOutcome::NotFound,
            Err(outcome) => outcome,
        }
    }

    fn run(&self, url: &str) -> Result<Option<Match>, ScrapeOutcome> {
        let url = parse_page_url(url).map_err(|e| {
            log::error!("Refusing to fetch {}: {}", url, e);
            ScrapeOutcome::FatalFailure(e.to_string())
        })?;

        retry(&self.policy, &self.sleeper, BrowserError::is_transient, |attempt| {
            self.attempt(url.as_str(), attempt)
        })
        .map_err(|e| match e {
            RetryError::Exhausted { last, .. } => ScrapeOutcome::TransientFailure(last.to_string()),
            RetryError::Fatal { error, .. } => ScrapeOutcome::FatalFailure(error.to_string()),
        })
    }

    /// One launch-collect-search cycle. The session is closed on every path.
    fn attempt(&self, url: &str, attempt: u32) -> Result<Option<Match>, BrowserError> {
        log::debug!(
            "Loading page (attempt {}/{}): {}",
            attempt + 1,
            self.policy.max_attempts(),
            url
        );

        let session = SessionGuard::new(self.factory.launch()?);
        let posts = self.collector.collect(&*session, url)?;
        let found = self.finder.find(posts);

        if found.is_none() {
            log::warn!("No recent flavor post found on {}", url);
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::browser::mock::{MockFactory, MockPage, MockPost};
    use crate::models::FlavorAnnouncement;
    use crate::pipeline::retry::tests::RecordingSleeper;

    const URL: &str = "https://www.facebook.com/test";

    fn orchestrator(pages: Vec<Result<MockPage, BrowserError>>) -> FetchOrchestrator<MockFactory, RecordingSleeper> {
        FetchOrchestrator::new(MockFactory::new(pages), &Config::default())
            .with_sleeper(RecordingSleeper::default())
    }

    fn timeout() -> BrowserError {
        BrowserError::timeout(r#"[role="article"]"#, Duration::from_secs(30))
    }

    #[test]
    fn third_post_is_the_announcement() {
        let fetch = orchestrator(vec![Ok(MockPage::with_posts(&[
            "Happy Monday everyone! Visit us soon.",
            "Check out our new hours!",
            "Today's custard flavor: CHOCOLATE CHIP!",
        ]))]);

        assert_eq!(
            fetch.resolve(URL),
            ScrapeOutcome::Found(FlavorAnnouncement::new("CHOCOLATE CHIP", None))
        );
        assert_eq!(fetch.factory.launches(), 1);
        assert_eq!(fetch.factory.events().last().map(String::as_str), Some("close"));
    }

    #[test]
    fn winning_post_text_is_returned() {
        let fetch = orchestrator(vec![Ok(MockPage::with_posts(&["Today's flavor is Vanilla Bean!"]))]);
        assert_eq!(
            fetch.fetch_flavor_post(URL).as_deref(),
            Some("Today's flavor is Vanilla Bean!")
        );
    }

    #[test]
    fn comment_announcement_is_ignored() {
        let page = MockPage::default()
            .post(MockPost::new("Big Deal\n2h\nHappy Friday!"))
            .post(MockPost::new("Flavor of the day: Butter Pecan").inside(0));
        let fetch = orchestrator(vec![Ok(page)]);

        assert_eq!(fetch.resolve(URL), ScrapeOutcome::NotFound);
    }

    #[test]
    fn timeouts_are_retried_with_backoff() {
        let fetch = orchestrator(vec![
            Ok(MockPage::default().wait_fails(timeout())),
            Ok(MockPage::default().goto_fails(timeout())),
            Ok(MockPage::with_posts(&["Flavor of the Day: Mint Oreo"])),
        ]);

        assert_eq!(
            fetch.resolve(URL),
            ScrapeOutcome::Found(FlavorAnnouncement::new("Mint Oreo", None))
        );
        assert_eq!(
            fetch.sleeper.slept(),
            vec![Duration::from_secs(2), Duration::from_secs(4)]
        );

        let events = fetch.factory.events();
        assert_eq!(fetch.factory.launches(), 3);
        assert_eq!(events.iter().filter(|e| *e == "close").count(), 3);
    }

    #[test]
    fn launch_failures_are_transient() {
        let fetch = orchestrator(vec![
            Err(BrowserError::automation("launch", "chrome crashed")),
            Err(BrowserError::automation("launch", "chrome crashed")),
            Err(BrowserError::automation("launch", "chrome crashed")),
        ]);

        match fetch.resolve(URL) {
            ScrapeOutcome::TransientFailure(reason) => assert!(reason.contains("chrome crashed")),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(fetch.factory.launches(), 3);
        assert_eq!(fetch.sleeper.slept().len(), 2);
    }

    #[test]
    fn fatal_error_is_not_retried() {
        let fetch = orchestrator(vec![
            Ok(MockPage::default().goto_fails(BrowserError::unexpected("bad state"))),
            Ok(MockPage::with_posts(&["Flavor of the Day: Never Reached"])),
        ]);

        assert!(matches!(fetch.resolve(URL), ScrapeOutcome::FatalFailure(_)));
        assert_eq!(fetch.factory.launches(), 1);
        assert!(fetch.sleeper.slept().is_empty());
        assert_eq!(fetch.factory.events().last().map(String::as_str), Some("close"));
    }

    #[test]
    fn invalid_url_never_launches() {
        let fetch = orchestrator(vec![Ok(MockPage::default())]);

        assert!(matches!(fetch.resolve("not a url"), ScrapeOutcome::FatalFailure(_)));
        assert_eq!(fetch.factory.launches(), 0);
    }

    #[test]
    fn no_announcement_is_not_found_without_retry() {
        let fetch = orchestrator(vec![Ok(MockPage::with_posts(&["Check out our new hours!"]))]);

        assert_eq!(fetch.resolve(URL), ScrapeOutcome::NotFound);
        assert_eq!(fetch.factory.launches(), 1);
        assert_eq!(fetch.fetch_flavor_post(URL), None);
    }
}

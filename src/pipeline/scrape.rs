// src/pipeline/scrape.rs

//! Per-brand scraping: every enabled location of a brand through the fetch
//! orchestrator, one record per location that announced a flavor.

use crate::browser::SessionFactory;
use crate::models::{FlavorEntry, Location, ScrapeConfig, ScrapeOutcome};
use crate::pipeline::fetch::FetchOrchestrator;
use crate::pipeline::retry::{Sleeper, ThreadSleeper};

/// Scrapes the social pages of one brand's locations.
pub struct SocialScraper<F, Z = ThreadSleeper> {
    brand: String,
    orchestrator: FetchOrchestrator<F, Z>,
    scrape: ScrapeConfig,
}

impl<F: SessionFactory, Z: Sleeper> SocialScraper<F, Z> {
    pub fn new(
        brand: impl Into<String>,
        orchestrator: FetchOrchestrator<F, Z>,
        scrape: ScrapeConfig,
    ) -> Self {
        Self {
            brand: brand.into(),
            orchestrator,
            scrape,
        }
    }

    /// Scrape `locations` in order. Failures are logged and never returned.
    pub fn scrape(&self, locations: &[Location]) -> Vec<FlavorEntry> {
        let tag = self.brand.to_uppercase();
        log::info!("{}: Starting scrape", tag);

        if locations.is_empty() {
            log::error!("{}: No locations found", tag);
            return Vec::new();
        }

        let mut entries = Vec::new();
        for location in locations {
            if let Some(entry) = self.scrape_location(location) {
                entries.push(entry);
            }
        }

        log::info!("{}: Found {} flavor(s)", tag, entries.len());
        entries
    }

    /// Scrape a single location.
    pub fn scrape_location(&self, location: &Location) -> Option<FlavorEntry> {
        let tag = self.brand.to_uppercase();
        let Some(page) = location.facebook.as_deref() else {
            log::error!("{}: No social page configured for {}", tag, location.name);
            return None;
        };

        log::info!("{}: Scraping {} ({})", tag, location.name, page);
        match self.orchestrator.resolve(page) {
            ScrapeOutcome::Found(announcement) => {
                log::info!("{}: {} -> {}", tag, location.name, announcement.name);
                Some(FlavorEntry::new(
                    &self.brand,
                    location,
                    announcement,
                    self.scrape.today(),
                ))
            }
            ScrapeOutcome::NotFound => {
                log::warn!("{}: No flavor post found for {}", tag, location.name);
                None
            }
            ScrapeOutcome::TransientFailure(reason) => {
                log::error!("{}: Gave up on {}: {}", tag, location.name, reason);
                None
            }
            ScrapeOutcome::FatalFailure(reason) => {
                log::error!("{}: Error scraping {}: {}", tag, location.name, reason);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::mock::{MockFactory, MockPage};
    use crate::error::BrowserError;
    use crate::models::Config;
    use crate::pipeline::retry::tests::RecordingSleeper;

    fn scraper(pages: Vec<Result<MockPage, BrowserError>>) -> SocialScraper<MockFactory, RecordingSleeper> {
        let config = Config::default();
        let orchestrator = FetchOrchestrator::new(MockFactory::new(pages), &config)
            .with_sleeper(RecordingSleeper::default());
        SocialScraper::new("bigdeal", orchestrator, config.scrape)
    }

    fn vliet() -> Location {
        Location {
            id: Some("bigdeal-vliet".into()),
            url: Some("https://bigdealburgers.com/".into()),
            lat: Some(43.0),
            lng: Some(-88.0),
            address: Some("123 Test St".into()),
            ..Location::new("Big Deal Burgers", "https://www.facebook.com/test")
        }
    }

    #[test]
    fn builds_record_from_announcement() {
        let scraper = scraper(vec![Ok(MockPage::with_posts(&[
            "Big Deal Burgers & Custard\n2h\n·\nToday's flavor is Orange Dream - orange and vanilla custard swirled together.\nAll reactions: 26",
        ]))]);

        let entries = scraper.scrape(&[vliet()]);

        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.flavor, "Orange Dream");
        assert_eq!(entry.description, "orange and vanilla custard swirled together");
        assert_eq!(entry.location, "Big Deal Burgers");
        assert_eq!(entry.location_id.as_deref(), Some("bigdeal-vliet"));
        assert_eq!(entry.brand, "Bigdeal");
        assert_eq!(entry.date, Config::default().scrape.today().format("%Y-%m-%d").to_string());
    }

    #[test]
    fn failures_produce_no_records() {
        let scraper = scraper(vec![
            Ok(MockPage::with_posts(&["Check out our new hours!"])),
            Ok(MockPage::default().goto_fails(BrowserError::unexpected("boom"))),
        ]);
        let mut second = vliet();
        second.name = "Second".into();

        assert!(scraper.scrape(&[vliet(), second]).is_empty());
    }

    #[test]
    fn location_without_page_is_skipped() {
        let scraper = scraper(vec![Ok(MockPage::with_posts(&["Flavor: Mint Oreo"]))]);
        let mut location = vliet();
        location.facebook = None;

        assert!(scraper.scrape(&[location]).is_empty());
        assert!(scraper.scrape(&[]).is_empty());
    }
}

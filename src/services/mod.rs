//! Service layer for the flavor scraper.
//!
//! This module contains the logic for:
//! - Post collection from a loaded page (`PostCollector`)
//! - Relative-timestamp classification (`RecencyClassifier`)
//! - Flavor extraction and name cleanup (`FlavorExtractor`, `sanitize`)
//! - Picking the winning post (`AnnouncementFinder`)

mod announcement;
mod collector;
mod extractor;
mod recency;
mod sanitize;

pub use announcement::{AnnouncementFinder, Match};
pub use collector::PostCollector;
pub use extractor::{CaptureSide, ExtractionRule, FlavorExtractor, looks_like_announcement};
pub use recency::{DEFAULT_HEADER_CHARS, Recency, RecencyClassifier, is_from_today};
pub use sanitize::sanitize;

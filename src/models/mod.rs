// src/models/mod.rs

//! Domain models for the flavor scraper.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod flavor;
mod location;
mod post;

// Re-export all public types
pub use config::{
    BrowserConfig, CollectorConfig, Config, LoggingConfig, RetryConfig, ScrapeConfig,
};
pub use flavor::{FlavorAnnouncement, FlavorEntry, FlavorReport, ScrapeOutcome};
pub use location::{Location, LocationRegistry};
pub use post::Post;

//! Pipeline entry points for flavor scraping.
//!
//! - `FetchOrchestrator`: retry-protected fetch of one page
//! - `SocialScraper`: all locations of one brand
//! - `run_generate`: several brands at once, written as one report

pub mod fetch;
pub mod generate;
pub mod retry;
pub mod scrape;

pub use fetch::FetchOrchestrator;
pub use generate::{run_generate, write_report};
pub use retry::{RetryError, RetryPolicy, Sleeper, ThreadSleeper, retry};
pub use scrape::SocialScraper;

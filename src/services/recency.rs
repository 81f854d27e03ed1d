// src/services/recency.rs

//! Relative-timestamp classifier.
//!
//! Social pages render a post's age near the top of the post ("3h", "Just now",
//! "2 days ago", "February 10 at 2:30 PM"). Only the post header is searched so
//! that numbers in the body ("open 10 to 9") do not count.

use std::sync::LazyLock;

use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

/// Default number of leading characters treated as the post header.
pub const DEFAULT_HEADER_CHARS: usize = 200;

static NOT_TODAY: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)\d+\s*d\b",
        r"(?i)\d+\s*day",
        r"(?i)\b(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?\s+\d{1,2}\b",
    ])
});

static TODAY: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)\bjust now\b",
        r"(?i)\d+\s*m\b",
        r"(?i)\d+\s*min",
        r"(?i)\d+\s*h\b",
        r"(?i)\d+\s*hr",
        r"(?i)\d+\s*hour",
    ])
});

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .filter_map(|p| match Regex::new(p) {
            Ok(re) => Some(re),
            Err(e) => {
                log::error!("Invalid recency pattern {}: {}", p, e);
                None
            }
        })
        .collect()
}

/// What the header says about a post's age.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recency {
    /// Minutes or hours old
    Today,
    /// Days old or dated
    NotToday,
    /// No recognizable timestamp
    Unknown,
}

impl Recency {
    /// Unknown counts as today so a real announcement is never missed.
    pub fn is_today(self) -> bool {
        self != Self::NotToday
    }
}

/// Classifies post text by the relative timestamp in its header.
#[derive(Debug, Clone, Copy)]
pub struct RecencyClassifier {
    header_chars: usize,
}

impl Default for RecencyClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_HEADER_CHARS)
    }
}

impl RecencyClassifier {
    pub fn new(header_chars: usize) -> Self {
        Self { header_chars }
    }

    pub fn classify(&self, text: &str) -> Recency {
        let header = self.header(text);

        if NOT_TODAY.iter().any(|re| re.is_match(header)) {
            log::debug!("Header marks post as older than today: {:?}", header);
            return Recency::NotToday;
        }
        if TODAY.iter().any(|re| re.is_match(header)) {
            return Recency::Today;
        }

        log::debug!("No timestamp found in post header");
        Recency::Unknown
    }

    pub fn is_from_today(&self, text: &str) -> bool {
        self.classify(text).is_today()
    }

    /// Leading `header_chars` user-perceived characters of `text`.
    fn header<'a>(&self, text: &'a str) -> &'a str {
        match text.grapheme_indices(true).nth(self.header_chars) {
            Some((end, _)) => &text[..end],
            None => text,
        }
    }
}

/// Classify with the default header window.
pub fn is_from_today(text: &str) -> bool {
    RecencyClassifier::default().is_from_today(text)
}

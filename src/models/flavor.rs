//! Flavor announcement, scrape outcome and output record.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::Location;

/// Flavor name and optional description pulled out of one post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlavorAnnouncement {
    /// Sanitized flavor name, 4 to 99 characters
    pub name: String,

    /// Text after " - " in the announcement, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FlavorAnnouncement {
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            name: name.into(),
            description,
        }
    }
}

/// What a fetch for one page resolves to.
#[derive(Debug, Clone, PartialEq)]
pub enum ScrapeOutcome {
    /// A post from today carried a recognizable flavor
    Found(FlavorAnnouncement),
    /// The page loaded but no post qualified
    NotFound,
    /// Every attempt hit a timeout or browser failure
    TransientFailure(String),
    /// A non-retryable error stopped the fetch
    FatalFailure(String),
}

/// One row of the published flavor list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlavorEntry {
    pub location: String,
    pub flavor: String,
    /// Empty when the post had no description
    pub description: String,
    /// `YYYY-MM-DD`
    pub date: String,
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub brand: String,
}

impl FlavorEntry {
    /// Build a record for `location`, carrying its metadata through.
    ///
    /// Coordinates are only kept when both are present.
    pub fn new(
        brand_key: &str,
        location: &Location,
        announcement: FlavorAnnouncement,
        date: NaiveDate,
    ) -> Self {
        let (lat, lng) = match (location.lat, location.lng) {
            (Some(lat), Some(lng)) => (Some(lat), Some(lng)),
            _ => (None, None),
        };

        Self {
            location: location.name.clone(),
            flavor: announcement.name,
            description: announcement.description.unwrap_or_default(),
            date: date.format("%Y-%m-%d").to_string(),
            url: location.url.clone(),
            location_id: location.id.clone().filter(|id| !id.is_empty()),
            lat,
            lng,
            address: location.address.clone().filter(|a| !a.is_empty()),
            brand: capitalize(brand_key),
        }
    }
}

/// Combined document written by `generate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlavorReport {
    pub generated_at: DateTime<FixedOffset>,
    /// `YYYY-MM-DD`
    pub generated_date: String,
    pub flavor_count: usize,
    pub flavors: Vec<FlavorEntry>,
}

impl FlavorReport {
    pub fn new(generated_at: DateTime<FixedOffset>, flavors: Vec<FlavorEntry>) -> Self {
        Self {
            generated_date: generated_at.format("%Y-%m-%d").to_string(),
            generated_at,
            flavor_count: flavors.len(),
            flavors,
        }
    }
}

/// "bigdeal" -> "Bigdeal"
fn capitalize(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vliet() -> Location {
        Location {
            id: Some("bigdeal-test".into()),
            name: "Big Deal Burgers".into(),
            url: Some("https://bigdealburgers.com/".into()),
            facebook: Some("https://www.facebook.com/test".into()),
            lat: Some(43.05627),
            lng: Some(-87.98273),
            address: Some("5832 W Vliet St, Milwaukee, WI 53208".into()),
            enabled: true,
        }
    }

    #[test]
    fn entry_carries_location_metadata() {
        let date = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let entry = FlavorEntry::new(
            "bigdeal",
            &vliet(),
            FlavorAnnouncement::new("Mint Oreo", None),
            date,
        );

        assert_eq!(entry.flavor, "Mint Oreo");
        assert_eq!(entry.description, "");
        assert_eq!(entry.date, "2026-06-01");
        assert_eq!(entry.brand, "Bigdeal");
        assert_eq!(entry.location_id.as_deref(), Some("bigdeal-test"));
        assert_eq!(entry.lat, Some(43.05627));
    }

    #[test]
    fn entry_drops_half_coordinates_and_empty_optionals() {
        let mut location = vliet();
        location.lng = None;
        location.address = Some(String::new());
        location.id = None;

        let entry = FlavorEntry::new(
            "leons",
            &location,
            FlavorAnnouncement::new("Butter Pecan", Some("creamy".into())),
            NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
        );

        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("lat").is_none());
        assert!(json.get("lng").is_none());
        assert!(json.get("address").is_none());
        assert!(json.get("location_id").is_none());
        assert_eq!(json["description"], "creamy");
        assert_eq!(json["brand"], "Leons");
    }

    #[test]
    fn capitalize_lowercases_the_tail() {
        assert_eq!(capitalize("bigDEAL"), "Bigdeal");
        assert_eq!(capitalize(""), "");
    }
}

//! Location registry: the shops whose pages are watched, grouped by brand.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// One physical shop.
///
/// Everything except `facebook` is passed through untouched into the
/// output record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Stable identifier (e.g., "bigdeal-vliet")
    #[serde(default)]
    pub id: Option<String>,

    /// Display name
    pub name: String,

    /// Canonical info page for the shop
    #[serde(default)]
    pub url: Option<String>,

    /// Social page that carries the daily announcement
    #[serde(default)]
    pub facebook: Option<String>,

    #[serde(default)]
    pub lat: Option<f64>,

    #[serde(default)]
    pub lng: Option<f64>,

    /// Street address
    #[serde(default)]
    pub address: Option<String>,

    /// Disabled locations are skipped
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Location {
    /// Minimal location pointing at a social page.
    pub fn new(name: impl Into<String>, facebook: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            url: None,
            facebook: Some(facebook.into()),
            lat: None,
            lng: None,
            address: None,
            enabled: true,
        }
    }
}

/// Brand key to locations, loaded from `locations.toml`.
///
/// ```toml
/// [[bigdeal]]
/// id = "bigdeal-vliet"
/// name = "Big Deal Burgers"
/// facebook = "https://www.facebook.com/bigdealburgers"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationRegistry {
    brands: BTreeMap<String, Vec<Location>>,
}

impl LocationRegistry {
    /// Load the registry from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load the registry or return an empty one if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Failed to load locations registry from {:?}: {}",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Enabled locations for a brand key.
    pub fn locations_for(&self, brand: &str) -> Vec<Location> {
        self.brands
            .get(brand)
            .map(|locations| locations.iter().filter(|l| l.enabled).cloned().collect())
            .unwrap_or_default()
    }

    /// All brand keys, sorted.
    pub fn brands(&self) -> impl Iterator<Item = &str> {
        self.brands.keys().map(String::as_str)
    }

    /// Check that every enabled location can actually be scraped.
    pub fn validate(&self) -> Result<()> {
        for (brand, locations) in &self.brands {
            for location in locations.iter().filter(|l| l.enabled) {
                if location.name.trim().is_empty() {
                    return Err(AppError::validation(format!(
                        "{brand}: location without a name"
                    )));
                }
                let Some(page) = &location.facebook else {
                    return Err(AppError::validation(format!(
                        "{brand}/{}: no social page URL",
                        location.name
                    )));
                };
                crate::utils::parse_page_url(page)?;
                if location.lat.is_some() != location.lng.is_some() {
                    return Err(AppError::validation(format!(
                        "{brand}/{}: lat and lng must be given together",
                        location.name
                    )));
                }
            }
        }
        Ok(())
    }
}

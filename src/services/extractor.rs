// src/services/extractor.rs

//! Flavor extraction from free-form post text.
//!
//! An ordered rule table is tried first; the first rule whose capture survives
//! sanitization and the sanity checks wins. When no rule qualifies, a
//! line-oriented fallback looks at the line after (or the rest of) any line
//! mentioning "flavor".

use std::sync::LazyLock;

use regex::Regex;

use crate::models::FlavorAnnouncement;
use crate::services::sanitize::sanitize;

/// Names must be strictly longer than this many characters...
const MIN_NAME_CHARS: usize = 3;
/// ...and strictly shorter than this many.
const MAX_NAME_CHARS: usize = 100;

/// Separates a flavor name from its description.
const DESCRIPTION_SEPARATOR: &str = " - ";

/// Where the flavor sits relative to the keyword a rule anchors on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureSide {
    /// "SALTED CARAMEL is our flavor of the day"
    BeforeKeyword,
    /// "Flavor of the day: Salted Caramel"
    AfterKeyword,
}

/// One pattern in the extraction cascade. Group 1 is the flavor capture.
#[derive(Debug, Clone)]
pub struct ExtractionRule {
    pub name: &'static str,
    pub pattern: Regex,
    pub capture: CaptureSide,
}

impl ExtractionRule {
    fn new(name: &'static str, pattern: &str, capture: CaptureSide) -> Option<Self> {
        match Regex::new(pattern) {
            Ok(pattern) => Some(Self {
                name,
                pattern,
                capture,
            }),
            Err(e) => {
                log::error!("Invalid extraction rule '{}': {}", name, e);
                None
            }
        }
    }

    fn capture<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.pattern
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}

/// The rule cascade, in priority order.
static RULES: LazyLock<Vec<ExtractionRule>> = LazyLock::new(|| {
    [
        (
            "name-is-our-flavor",
            r"(?im)([A-Z][A-Z\s&]+?)\s+is\s+(?:our\s+)?(?:the\s+)?flavor(?:\s+of\s+the\s+day)?",
            CaptureSide::BeforeKeyword,
        ),
        (
            "flavor-of-the-day",
            r"(?im)flavor(?:\s+of\s+the\s+day)?[\s:]+(?:is\s+)?([A-Z][^\n.!?]+?)(?:\n|$|!|\.|  )",
            CaptureSide::AfterKeyword,
        ),
        (
            "todays-flavor",
            r"(?im)today['’]?s?\s+flavor[\s:]+(?:is\s+)?([A-Z][^\n.!?]+?)(?:\n|$|!|\.|  )",
            CaptureSide::AfterKeyword,
        ),
        (
            "flavor-today",
            r"(?im)(?:flavor\s+)?today[\s:]+([A-Z][^\n.!?]+?)(?:\n|$|!|\.|  )",
            CaptureSide::AfterKeyword,
        ),
    ]
    .into_iter()
    .filter_map(|(name, pattern, side)| ExtractionRule::new(name, pattern, side))
    .collect()
});

static FLAVOR_PREFIX: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i).*?flavor(?:\s+of\s+the\s+day)?[\s:]*").ok());

static ANNOUNCEMENT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"flavor of the day",
        r"today['’]s flavor",
        r"is our flavor",
        r"our flavor(?: of the day)? is",
        r"flavor:?[\s-]+",
        r"custard flavor",
    ]
    .into_iter()
    .filter_map(|p| Regex::new(&format!("(?i){p}")).ok())
    .collect()
});

const FLAVOR_WORDS: &[&str] = &["flavor", "custard"];
const TIME_WORDS: &[&str] = &["today", "daily", "of the day", "tonight"];

/// Whether a post reads like a flavor announcement rather than a generic
/// update that happens to mention custard.
pub fn looks_like_announcement(text: &str) -> bool {
    let lower = text.to_lowercase();
    let has_flavor_word = FLAVOR_WORDS.iter().any(|w| lower.contains(w));
    if !has_flavor_word {
        return false;
    }
    TIME_WORDS.iter().any(|w| lower.contains(w))
        || ANNOUNCEMENT_PATTERNS.iter().any(|re| re.is_match(&lower))
}

/// Pulls a flavor name and optional description out of post text.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlavorExtractor;

impl FlavorExtractor {
    pub fn new() -> Self {
        Self
    }

    /// The rules tried, in order.
    pub fn rules(&self) -> &'static [ExtractionRule] {
        &RULES
    }

    pub fn extract(&self, text: &str) -> Option<FlavorAnnouncement> {
        log::debug!("Extracting flavor from: {:?}", preview(text));

        for rule in self.rules() {
            let Some(raw) = rule.capture(text) else {
                continue;
            };
            match split_announcement(&sanitize(raw)) {
                Some(announcement) => {
                    log::debug!(
                        "Rule {} matched: {} ({:?})",
                        rule.name,
                        announcement.name,
                        announcement.description
                    );
                    return Some(announcement);
                }
                None => log::debug!("Rule {} capture {:?} rejected", rule.name, raw),
            }
        }

        let found = Self::fallback(text);
        if found.is_none() {
            log::warn!("Could not extract a flavor name from post");
        }
        found
    }

    /// Line scan for "flavor" followed by the name on the next line or later
    /// on the same line.
    fn fallback(text: &str) -> Option<FlavorAnnouncement> {
        let lines: Vec<&str> = text.split('\n').collect();

        for (i, line) in lines.iter().enumerate() {
            if !line.to_lowercase().contains("flavor") {
                continue;
            }

            if let Some(next) = lines.get(i + 1).map(|l| l.trim()) {
                let starts_upper = next.chars().next().is_some_and(char::is_uppercase);
                if starts_upper && within_bounds(next) {
                    if let Some(name) = accept(&sanitize(next)) {
                        log::debug!("Extracted flavor from next line: {}", name);
                        return Some(FlavorAnnouncement::new(name, None));
                    }
                }
            }

            let rest = match FLAVOR_PREFIX.as_ref() {
                Some(prefix) => prefix.replace_all(line, ""),
                None => continue,
            };
            let rest = rest.trim_matches(|c: char| " :,-!.".contains(c));
            if within_bounds(rest) && !rest.to_lowercase().starts_with("is") {
                if let Some(name) = accept(&sanitize(rest)) {
                    log::debug!("Extracted flavor from same line: {}", name);
                    return Some(FlavorAnnouncement::new(name, None));
                }
            }
        }

        None
    }
}

/// Split "Name - description" and apply the name checks.
fn split_announcement(sanitized: &str) -> Option<FlavorAnnouncement> {
    let (name, description) = match sanitized.split_once(DESCRIPTION_SEPARATOR) {
        Some((name, description)) => {
            let description = description.trim();
            (
                name.trim(),
                (!description.is_empty()).then(|| description.to_string()),
            )
        }
        None => (sanitized, None),
    };

    if name.to_lowercase().starts_with("of the") {
        return None;
    }
    accept(name).map(|name| FlavorAnnouncement::new(name, description))
}

fn accept(name: &str) -> Option<String> {
    within_bounds(name).then(|| name.to_string())
}

fn within_bounds(s: &str) -> bool {
    let len = s.chars().count();
    len > MIN_NAME_CHARS && len < MAX_NAME_CHARS
}

fn preview(text: &str) -> &str {
    match text.char_indices().nth(200) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

//! Static HTML snapshot driver.
//!
//! Replays a saved page through the same collector used for live pages.
//! Nothing renders, so scrolling and expansion are no-ops and selector waits
//! resolve immediately.

use std::fs;
use std::path::Path;
use std::time::Duration;

use scraper::{ElementRef, Html, Selector};

use crate::browser::{BrowserSession, PostHandle, SessionFactory, has_ancestor_matching};
use crate::error::{BrowserError, Result};

/// Tags rendered on their own line.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li",
    "main", "nav", "ol", "p", "pre", "section", "table", "tr", "ul",
];

/// Tags whose content is never visible.
const HIDDEN_TAGS: &[&str] = &["script", "style", "template", "noscript", "head"];

/// Hands out sessions over the same saved HTML.
#[derive(Debug, Clone)]
pub struct SnapshotFactory {
    html: String,
}

impl SnapshotFactory {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    /// Read a saved page from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(fs::read_to_string(path)?))
    }
}

impl SessionFactory for SnapshotFactory {
    type Session = SnapshotSession;

    fn launch(&self) -> std::result::Result<SnapshotSession, BrowserError> {
        Ok(SnapshotSession::new(&self.html))
    }
}

/// A parsed document standing in for a live page.
pub struct SnapshotSession {
    document: Html,
}

impl SnapshotSession {
    pub fn new(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }
}

impl BrowserSession for SnapshotSession {
    type Post<'a> = SnapshotPost<'a>;

    fn goto(&self, url: &str, _timeout: Duration) -> std::result::Result<(), BrowserError> {
        log::debug!("Replaying snapshot in place of {}", url);
        Ok(())
    }

    fn wait_for_selector(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> std::result::Result<(), BrowserError> {
        let parsed = parse_selector(selector)?;
        if self.document.select(&parsed).next().is_some() {
            Ok(())
        } else {
            Err(BrowserError::timeout(selector, timeout))
        }
    }

    fn scroll_to_fraction(&self, _fraction: f64) -> std::result::Result<(), BrowserError> {
        Ok(())
    }

    fn pause(&self, _duration: Duration) {}

    fn query_all(&self, selector: &str) -> std::result::Result<Vec<SnapshotPost<'_>>, BrowserError> {
        let parsed = parse_selector(selector)?;
        Ok(self
            .document
            .select(&parsed)
            .map(|element| SnapshotPost { element })
            .collect())
    }

    fn close(&mut self) -> std::result::Result<(), BrowserError> {
        Ok(())
    }
}

/// A post element inside a snapshot.
pub struct SnapshotPost<'a> {
    element: ElementRef<'a>,
}

impl PostHandle for SnapshotPost<'_> {
    fn is_nested(&self, post_selector: &str) -> std::result::Result<bool, BrowserError> {
        let parsed = parse_selector(post_selector)?;
        has_ancestor_matching(&self.element, |ancestor| parsed.matches(ancestor))
    }

    fn expand(
        &self,
        _post_selector: &str,
        _labels: &[String],
    ) -> std::result::Result<bool, BrowserError> {
        Ok(false)
    }

    fn inner_text(&self) -> std::result::Result<String, BrowserError> {
        Ok(inner_text(self.element))
    }
}

/// Approximate `innerText`: block elements on their own lines, whitespace
/// collapsed within a line, blank lines dropped.
pub fn inner_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    render(element, &mut raw);

    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn render(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
            continue;
        }
        let Some(child) = ElementRef::wrap(child) else {
            continue;
        };

        let name = child.value().name();
        if name == "br" {
            out.push('\n');
            continue;
        }
        if HIDDEN_TAGS.contains(&name) {
            continue;
        }

        let block = BLOCK_TAGS.contains(&name);
        if block {
            out.push('\n');
        }
        render(child, out);
        if block {
            out.push('\n');
        }
    }
}

fn parse_selector(selector: &str) -> std::result::Result<Selector, BrowserError> {
    Selector::parse(selector)
        .map_err(|e| BrowserError::unexpected(format!("invalid selector '{selector}': {e:?}")))
}

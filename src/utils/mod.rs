//! Utility functions and helpers.

use url::Url;

use crate::error::{AppError, Result};

/// Parse a social page URL, accepting only absolute http(s) URLs with a host.
pub fn parse_page_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        scheme => Err(AppError::validation(format!(
            "unsupported page URL '{raw}' (scheme: {scheme})"
        ))),
    }
}

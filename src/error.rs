// src/error.rs

//! Unified error handling for the flavor scraper.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Result type alias for application operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Failure raised while driving a browser session.
///
/// Timeouts and automation failures are expected to clear up on their own
/// and are retried by the fetch orchestrator. Anything else is fatal.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BrowserError {
    /// Navigation or selector wait exceeded its budget
    #[error("Timed out after {}s waiting for {what}", timeout.as_secs())]
    Timeout { what: String, timeout: Duration },

    /// The browser or page misbehaved (launch failure, crash, dropped connection)
    #[error("Browser automation failed during {stage}: {message}")]
    Automation { stage: String, message: String },

    /// Anything that is not a browser hiccup
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl BrowserError {
    /// Create a timeout error.
    pub fn timeout(what: impl Into<String>, timeout: Duration) -> Self {
        Self::Timeout {
            what: what.into(),
            timeout,
        }
    }

    /// Create an automation error for the given stage.
    pub fn automation(stage: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Automation {
            stage: stage.into(),
            message: message.to_string(),
        }
    }

    /// Create an unexpected (non-retryable) error.
    pub fn unexpected(message: impl fmt::Display) -> Self {
        Self::Unexpected(message.to_string())
    }

    /// Whether retrying the whole attempt may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Automation { .. })
    }
}

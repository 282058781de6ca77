// src/error.rs

//! Unified error handling for the notifier.
//!
//! Every variant here is fatal for a run. Per-record conditions (a record that
//! cannot be turned into a post, a post without an identity) are not errors;
//! they travel as [`ExtractionSkip`](crate::models::ExtractionSkip) and
//! `Option<PostId>` values instead.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type alias for notifier operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration file does not exist
    #[error("Config file not found: {}. Copy config.example.json to config.json and fill in your values.", path.display())]
    ConfigNotFound { path: PathBuf },

    /// Configuration file exists but is unusable
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    /// Source content could not be fetched or parsed
    #[error("Fetch failed for {source_ref}: {message}")]
    Fetch { source_ref: String, message: String },

    /// Push notification could not be delivered
    #[error("Dispatch failed: {0}")]
    Dispatch(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client setup failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },
}

impl AppError {
    /// Create a missing-config error.
    pub fn config_not_found(path: impl AsRef<Path>) -> Self {
        Self::ConfigNotFound {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Create an invalid-config error.
    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::ConfigInvalid(message.into())
    }

    /// Create a fetch error with the source it came from.
    pub fn fetch(source_ref: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            source_ref: source_ref.into(),
            message: message.to_string(),
        }
    }

    /// Create a dispatch error.
    pub fn dispatch(message: impl fmt::Display) -> Self {
        Self::Dispatch(message.to_string())
    }

    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_mentions_path() {
        let err = AppError::config_not_found("/tmp/missing.json");
        assert!(err.to_string().contains("/tmp/missing.json"));
    }

    #[test]
    fn test_fetch_error_format() {
        let err = AppError::fetch("https://example.com/feed", "HTTP 503");
        assert_eq!(
            err.to_string(),
            "Fetch failed for https://example.com/feed: HTTP 503"
        );
    }
}

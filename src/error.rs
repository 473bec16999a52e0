// src/error.rs

//! Unified error handling for the toolkit.

use std::fmt;

use thiserror::Error;

/// Result type alias for toolkit operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// AWS S3 error
    #[error("S3 error: {0}")]
    S3(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

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

    /// WARC record could not be read
    #[error("WARC error: {0}")]
    Warc(String),

    /// Capture timestamp could not be parsed
    #[error("Invalid timestamp '{0}'")]
    Timestamp(String),

    /// A line of an external index file did not match its schema
    #[error("Index schema error on line {line}: {message}")]
    IndexSchema { line: usize, message: String },

    /// Chart or image rendering failed
    #[error("Render error: {0}")]
    Render(String),
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

    /// Create an S3 error from any displayable SDK error.
    pub fn s3(message: impl fmt::Display) -> Self {
        Self::S3(message.to_string())
    }

    /// Create a WARC decoding error.
    pub fn warc(message: impl fmt::Display) -> Self {
        Self::Warc(message.to_string())
    }

    /// Create an index schema error for a 1-based line number.
    pub fn index_schema(line: usize, message: impl fmt::Display) -> Self {
        Self::IndexSchema {
            line,
            message: message.to_string(),
        }
    }

    /// Create a rendering error.
    pub fn render(message: impl fmt::Display) -> Self {
        Self::Render(message.to_string())
    }
}

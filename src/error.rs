// src/error.rs

//! Unified error handling for the console.

use std::fmt;

use thiserror::Error;

/// Result type alias for console operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP request could not be sent or its body could not be read
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-2xx status
    #[error("Request to {url} failed with status {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    /// Gateway envelope carried a body that is not JSON
    #[error("Malformed gateway envelope: body was not valid JSON ({0})")]
    MalformedEnvelope(String),

    /// Requested entity does not exist
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Backend acknowledged a request but reported failure
    #[error("Request rejected by backend: {0}")]
    Rejected(String),

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

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a not-found error for an entity kind.
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Create a malformed envelope error from the underlying parse failure.
    pub fn malformed_envelope(cause: impl fmt::Display) -> Self {
        Self::MalformedEnvelope(cause.to_string())
    }

    /// True for failures of the transport itself or non-2xx answers.
    pub fn is_network_failure(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Status { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_envelope_message_mentions_json() {
        let err = AppError::malformed_envelope("expected value at line 1 column 1");
        assert!(err.to_string().contains("not valid JSON"));
    }

    #[test]
    fn status_is_network_failure() {
        let err = AppError::Status {
            url: "http://localhost/x".to_string(),
            status: 502,
            body: "bad gateway".to_string(),
        };
        assert!(err.is_network_failure());
        assert!(!AppError::not_found("lambda", "x").is_network_failure());
    }

    #[test]
    fn not_found_message() {
        let err = AppError::not_found("lambda", "emailing");
        assert_eq!(err.to_string(), "lambda not found: emailing");
    }
}

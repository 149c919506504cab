// src/error.rs

//! Unified error handling for the discovery application.

use std::fmt;

use thiserror::Error;

/// Result type alias for discovery operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// connpass API rejected the request (HTTP 401)
    #[error("connpass API authentication failed (HTTP 401)")]
    ApiAuth,

    /// connpass API rate limit persisted after the single retry (HTTP 429)
    #[error("connpass API rate limit exceeded (HTTP 429 after retry)")]
    ApiRateLimited,

    /// connpass API returned an unexpected HTTP status
    #[error("connpass API returned HTTP {status}")]
    ApiStatus { status: u16 },

    /// Storage backend failed during the tagged operation
    #[error("Storage error during {operation}: {message}")]
    Storage { operation: String, message: String },

    /// Notification publish failed
    #[error("Notification error: {0}")]
    Notification(String),

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

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a storage error tagged with the failing operation.
    pub fn storage(operation: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Storage {
            operation: operation.into(),
            message: message.to_string(),
        }
    }

    /// Create a notification error.
    pub fn notification(message: impl fmt::Display) -> Self {
        Self::Notification(message.to_string())
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether this is a classified connpass API error (auth, rate limit,
    /// unexpected status). The discovery run folds classified errors into
    /// its result; everything else propagates to the caller.
    pub fn is_classified_api(&self) -> bool {
        matches!(
            self,
            Self::ApiAuth | Self::ApiRateLimited | Self::ApiStatus { .. }
        )
    }
}

//! Longform error types

use std::time::Duration;

/// Longform error types
#[derive(Debug, thiserror::Error)]
pub enum LongformError {
    // Provider/network errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("model not found: {0}")]
    ModelNotFound(String),

    #[error("empty response from model")]
    EmptyResponse,

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    // Cache addressing errors
    #[error("invalid cache key: {0}")]
    InvalidKey(String),

    #[error("invalid cache path: {0}")]
    InvalidPath(String),

    // Configuration errors
    /// No usable credential was supplied. Raised by the builder before
    /// any request is attempted.
    #[error("credential unavailable: {source_name} is not set")]
    MissingCredential { source_name: String },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("operation not implemented: {0}")]
    NotImplemented(&'static str),
}

impl LongformError {
    /// Whether the error is worth retrying (rate limits, network faults,
    /// server-side failures).
    pub fn is_transient(&self) -> bool {
        match self {
            LongformError::RateLimited { .. }
            | LongformError::Http(_)
            | LongformError::EmptyResponse => true,
            LongformError::Api { status, .. } => matches!(status, 500 | 502 | 503 | 504),
            _ => false,
        }
    }

    /// Provider-supplied backoff hint, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            LongformError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

/// Result type alias for Longform operations
pub type Result<T> = std::result::Result<T, LongformError>;

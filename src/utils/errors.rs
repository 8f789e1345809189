//! Error handling for the IFMeetup client
//!
//! This module defines the low-level error type raised by the API wrapper
//! and the internal plumbing. Anything surfaced to a UI goes through the
//! classifier in `crate::errors` first; raw `ClientError` values never
//! reach presentation code.

use thiserror::Error;

use crate::errors::StructuredError;

/// Main error type for IFMeetup client operations
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// An HTTP response arrived but reported failure. `code` carries the
    /// machine-readable domain code from the error body when present
    /// (e.g. `event_full`).
    #[error("API error (HTTP {status})")]
    Api {
        status: u16,
        code: Option<String>,
        message: Option<String>,
    },

    /// An error that was already classified upstream.
    #[error("{}", .0.user_message)]
    Structured(StructuredError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for IFMeetup client operations
pub type Result<T> = std::result::Result<T, ClientError>;

impl ClientError {
    /// Check if the error is recoverable by simply trying again
    pub fn is_recoverable(&self) -> bool {
        match self {
            ClientError::Http(_) => true,
            ClientError::Serialization(_) => false,
            ClientError::Config(_) => false,
            ClientError::UrlParse(_) => false,
            ClientError::Api { status, .. } => matches!(status, 408 | 429 | 500 | 502 | 503 | 504),
            ClientError::Structured(e) => e.can_retry,
            ClientError::InvalidInput(_) => false,
        }
    }
}

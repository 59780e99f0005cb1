//! Error types for wxmon-core.
//!
//! # Error Recovery
//!
//! | Error Type | Strategy |
//! |------------|----------|
//! | [`Error::Http`] | Retry with backoff (transport failures are usually transient) |
//! | [`Error::Status`] | Retry with backoff (upstream may recover) |
//! | [`Error::Parse`] | Do not retry, the payload itself is broken |
//! | [`Error::Cancelled`] | Do not retry, never surfaced as a user error |
//!
//! The retry loop in [`crate::retry`] applies this classification via
//! [`Error::is_transient`].

use thiserror::Error;

/// Errors that can occur while fetching weather data.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Transport-level HTTP failure (connection, timeout, TLS, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream replied with a non-success status code.
    #[error("Unexpected HTTP status {status}")]
    Status {
        /// The status code returned by the server.
        status: u16,
    },

    /// Response body was malformed or missing required fields.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Operation was cancelled.
    #[error("Operation cancelled")]
    Cancelled,
}

impl Error {
    /// Create a parse error with a message.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Create a status error from a reqwest status code.
    pub fn status(status: reqwest::StatusCode) -> Self {
        Self::Status {
            status: status.as_u16(),
        }
    }

    /// Whether the failure is likely to succeed on retry.
    ///
    /// Transport errors and non-success statuses are transient; parse
    /// failures and cancellation are not.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Http(_) | Error::Status { .. })
    }
}

/// Result type alias using wxmon-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

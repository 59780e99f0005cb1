//! Error types for wxmon-store.

use std::path::PathBuf;

/// Result type for wxmon-store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in wxmon-store.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Failed to create cache directory.
    #[error("Failed to create cache directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

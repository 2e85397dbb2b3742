//! Error types for `Lnode` core library.

use thiserror::Error;

/// Result type alias using `Lnode` Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for `Lnode` operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or missing input, detected before any store access
    #[error("{0}")]
    Validation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

//! Error types for the store module.

use thiserror::Error;

use medf_core::CoreError;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Source file not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Stored bytes do not match the key they were filed under.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// A stored record or digest could not be parsed.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

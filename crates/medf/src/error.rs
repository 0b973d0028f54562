//! Error types for the workspace.

use medf_core::CoreError;
use medf_store::StoreError;
use thiserror::Error;

/// Errors that can occur during workspace operations.
#[derive(Debug, Error)]
pub enum MedfError {
    /// Parse, digest or signature error.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// The source was never committed.
    #[error("no history for {0}")]
    NoHistory(String),

    /// A document loaded with verification on did not match its claim.
    #[error("document {source_name} does not match its doc_hash: expected {expected}, got {actual}")]
    DigestMismatch {
        source_name: String,
        expected: String,
        actual: String,
    },
}

/// Result type for workspace operations.
pub type Result<T> = std::result::Result<T, MedfError>;

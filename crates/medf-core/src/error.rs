//! Error types for MEDF Core.
//!
//! Every variant here means "cannot evaluate": the input could not be turned
//! into a usable document, record, digest or key. A document that parses but
//! fails verification is not an error; it is reported through
//! [`VerificationResult`](crate::verify::VerificationResult).

use thiserror::Error;

/// Core errors that can occur while parsing or signing.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed input: {0}")]
    Malformed(String),

    #[error("duplicate block_id: {0}")]
    DuplicateBlockId(String),

    #[error("invalid digest {value:?}: {reason}")]
    InvalidDigest { value: String, reason: &'static str },

    #[error("no document hash")]
    MissingEnvelope,

    #[error("document is not signed")]
    MissingSignature,

    #[error("unsupported signature algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("invalid signature")]
    InvalidSignature,
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

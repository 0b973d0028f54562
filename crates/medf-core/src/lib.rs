//! # MEDF Core
//!
//! Pure primitives for MEDF documents: canonical form, digests, commit
//! chains and verification.
//!
//! This crate contains no I/O and no logging. Every function is a pure
//! computation over its arguments.
//!
//! ## Key Types
//!
//! - [`Document`] - Ordered text blocks plus an integrity envelope
//! - [`CommitRecord`] - One link in the hash-linked history of a source file
//! - [`VerificationResult`] - Outcome of checking a document's `doc_hash`
//! - [`ChainReport`] - Outcome of walking a sequence of commit records
//!
//! ## Canonicalization
//!
//! Everything that is hashed goes through the canonical JSON encoder. See
//! the [`canonical`] module.

pub mod canonical;
pub mod commit;
pub mod crypto;
pub mod document;
pub mod envelope;
pub mod error;
pub mod verify;

pub use canonical::{canonicalize, canonicalize_block, to_canonical_json};
pub use commit::{commit, CommitBuilder, CommitRecord, CommittedContent, Intent};
pub use crypto::{digest, Ed25519PublicKey, Ed25519Signature, Keypair, Sha256Digest};
pub use document::{Block, DocHash, DocSignature, Document};
pub use envelope::{seal, sign_document, verify_signature};
pub use error::{CoreError, Result};
pub use verify::{
    verify, verify_blocks, verify_chain, verify_content, verify_rooted_chain, BlockMismatch,
    ChainBreak, ChainReport, VerificationResult,
};

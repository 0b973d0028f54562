//! # MEDF
//!
//! Machine-verifiable documents: content-addressed integrity for text
//! documents and hash-linked commit histories for source files.
//!
//! ## Overview
//!
//! - **Documents**: Ordered text blocks sealed with a `doc_hash` over their
//!   canonical JSON form, optionally signed with Ed25519
//! - **Commit records**: Immutable records of a file's content digest, author
//!   and intent, each linked to the digest of its predecessor
//! - **Verification**: Recompute and compare; a mismatch is a result, not an
//!   error
//!
//! ## Key Concepts
//!
//! - **Canonical form**: Sorted keys, no whitespace, raw UTF-8. One encoder
//!   for everything that is hashed.
//! - **Envelope**: `doc_hash` and `signature` sit outside the digest they
//!   describe.
//! - **Chain**: A record never changes. A revision is a new record whose
//!   `previous` is the digest of the whole prior record.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use medf::{FsStore, Workspace, WorkspaceConfig};
//!
//! async fn example() -> medf::Result<()> {
//!     let workspace = Workspace::new(FsStore::open("."), WorkspaceConfig::default());
//!
//!     // Commit the current contents of a file
//!     let record = workspace.commit_source("notes.md", "alice", "first draft").await?;
//!     println!("committed {}", record.document.content_hash);
//!
//!     // Later: has the file changed, and is its history intact?
//!     let check = workspace.verify_source("notes.md").await?;
//!     let report = workspace.verify_history("notes.md").await?;
//!     println!("content ok: {}, chain intact: {}", check.matches, report.is_intact());
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `medf::core` - Pure primitives (canonical form, digests, records, verification)
//! - `medf::store` - Storage abstraction, filesystem and memory stores

pub mod error;
pub mod workspace;

// Re-export component crates
pub use medf_core as core;
pub use medf_store as store;

// Re-export main types for convenience
pub use error::{MedfError, Result};
pub use workspace::{SourceCheck, Workspace, WorkspaceConfig};

// Re-export commonly used core types
pub use medf_core::{
    canonicalize, commit, digest, seal, sign_document, verify, verify_blocks, verify_chain,
    verify_content, verify_rooted_chain, verify_signature, Block, ChainBreak, ChainReport,
    CommitBuilder, CommitRecord, DocHash, DocSignature, Document, Ed25519PublicKey, Keypair,
    VerificationResult,
};
pub use medf_store::{FsStore, MemoryStore, Store, StoreExt};

//! # MEDF Store
//!
//! Storage abstraction for MEDF. Provides a trait-based interface for source
//! bytes and commit records with filesystem and in-memory implementations.
//!
//! ## Overview
//!
//! The store module abstracts persistence behind the [`Store`] trait,
//! allowing the workspace facade to be storage-agnostic. The primary
//! implementation is [`FsStore`], with [`MemoryStore`] for testing.
//!
//! ## Key Types
//!
//! - [`Store`] - The async trait for all storage operations
//! - [`StoreExt`] - History walking and head advancement on top of [`Store`]
//! - [`FsStore`] - Files next to their sources plus a content-addressed archive
//! - [`MemoryStore`] - In-memory storage for tests
//!
//! ## Usage
//!
//! ```rust,no_run
//! use medf_store::{FsStore, StoreExt};
//!
//! async fn example() {
//!     let store = FsStore::open(".");
//!     let history = store.load_history("notes.md").await.unwrap();
//!     println!("{} revisions", history.len());
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Idempotent archive**: Archiving the same record twice returns `AlreadyExists`
//! - **Checked keys**: A record can only be archived under its own digest
//! - **No verification**: Stores hand back bytes; checking them is the core's job

pub mod error;
pub mod fs;
pub mod memory;
pub mod traits;

pub use error::{Result, StoreError};
pub use fs::FsStore;
pub use memory::MemoryStore;
pub use traits::{ArchiveResult, Store, StoreExt};

//! Store trait: the abstract interface for sources and their histories.
//!
//! The core never touches storage. A store hands it bytes (source files,
//! serialized records) and files away what it produces. Implementations
//! include the filesystem (primary) and in-memory (for tests).

use std::collections::HashSet;

use async_trait::async_trait;
use medf_core::{digest, CommitRecord};
use tracing::{debug, warn};

use crate::error::{Result, StoreError};

/// Result of archiving a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveResult {
    /// Record was archived.
    Inserted,
    /// Record was already archived (idempotent - not an error).
    AlreadyExists,
}

/// The Store trait: async interface for source bytes and commit records.
///
/// # Design Notes
///
/// - **Sources** are addressed by a relative name such as `notes/a.md`.
/// - **Head**: the newest serialized record of a source. Overwritten on
///   every commit.
/// - **Archive**: every serialized record, keyed by its tagged digest. A
///   record's `previous` field is such a key, so the chain can be walked
///   back from the head.
#[async_trait]
pub trait Store: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Source Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Read the raw bytes of a source. Fails with `NotFound` if absent.
    async fn read_source(&self, source: &str) -> Result<Vec<u8>>;

    /// Replace the raw bytes of a source.
    async fn write_source(&self, source: &str, bytes: &[u8]) -> Result<()>;

    // ─────────────────────────────────────────────────────────────────────────
    // Record Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Get the head record bytes of a source, if it was ever committed.
    async fn head(&self, source: &str) -> Result<Option<Vec<u8>>>;

    /// Replace the head record bytes of a source.
    async fn put_head(&self, source: &str, record: &[u8]) -> Result<()>;

    /// File a serialized record under its digest.
    ///
    /// Rejects bytes whose digest is not `digest`.
    async fn archive(&self, digest: &str, record: &[u8]) -> Result<ArchiveResult>;

    /// Get archived record bytes by digest.
    async fn archived(&self, digest: &str) -> Result<Option<Vec<u8>>>;
}

/// Check that `record` is filed under its own digest.
pub(crate) fn check_archive_key(key: &str, record: &[u8]) -> Result<()> {
    let actual = digest(record);
    if actual != key {
        return Err(StoreError::InvalidData(format!(
            "record digest {actual} filed under {key}"
        )));
    }
    Ok(())
}

/// Extension trait for common store patterns.
pub trait StoreExt: Store {
    /// Archive a record and make it the head of `source`.
    fn advance_head(
        &self,
        source: &str,
        record: &[u8],
    ) -> impl std::future::Future<Output = Result<String>> + Send;

    /// Load the history of `source`, oldest first.
    ///
    /// Walks `previous` links back from the head through the archive. The
    /// walk stops at a genesis record, at a digest missing from the archive
    /// (a truncated history), or at a digest already visited. Returns an
    /// empty vector if the source was never committed.
    fn load_history(
        &self,
        source: &str,
    ) -> impl std::future::Future<Output = Result<Vec<CommitRecord>>> + Send;
}

impl<S: Store + ?Sized> StoreExt for S {
    async fn advance_head(&self, source: &str, record: &[u8]) -> Result<String> {
        let key = digest(record);
        let result = self.archive(&key, record).await?;
        self.put_head(source, record).await?;
        debug!(source, digest = %key, ?result, "advanced head");
        Ok(key)
    }

    async fn load_history(&self, source: &str) -> Result<Vec<CommitRecord>> {
        let Some(head) = self.head(source).await? else {
            return Ok(Vec::new());
        };

        let mut current = Some(CommitRecord::from_json(&head)?);
        let mut seen = HashSet::new();
        let mut records = Vec::new();

        while let Some(record) = current.take() {
            let prev = record.previous.clone();
            records.push(record);

            let Some(prev) = prev else { break };
            if !seen.insert(prev.clone()) {
                warn!(source, digest = %prev, "history loops back on itself");
                break;
            }
            match self.archived(&prev).await? {
                Some(bytes) => current = Some(CommitRecord::from_json(&bytes)?),
                None => warn!(source, digest = %prev, "history truncated: record not archived"),
            }
        }

        records.reverse();
        debug!(source, len = records.len(), "loaded history");
        Ok(records)
    }
}

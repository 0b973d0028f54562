//! In-memory implementation of the Store trait.
//!
//! This is primarily for testing. It has the same semantics as the
//! filesystem store but keeps everything in memory with no persistence.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::error::{Result, StoreError};
use crate::traits::{check_archive_key, ArchiveResult, Store};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    /// Source bytes by name.
    sources: HashMap<String, Vec<u8>>,

    /// Head record bytes by source name.
    heads: HashMap<String, Vec<u8>>,

    /// Archived record bytes by digest.
    records: HashMap<String, Vec<u8>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner::default()),
        }
    }

    /// Create a store pre-populated with sources.
    pub fn with_sources<I, K, V>(sources: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Vec<u8>>,
    {
        let store = Self::new();
        store.write().sources.extend(
            sources
                .into_iter()
                .map(|(name, bytes)| (name.into(), bytes.into())),
        );
        store
    }

    /// Number of archived records.
    pub fn archived_len(&self) -> usize {
        self.read().records.len()
    }

    /// Drop an archived record, simulating a truncated history.
    pub fn forget(&self, digest: &str) -> bool {
        self.write().records.remove(digest).is_some()
    }

    // A panicking writer leaves plain maps behind; the data is still usable.
    fn read(&self) -> RwLockReadGuard<'_, MemoryStoreInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, MemoryStoreInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn read_source(&self, source: &str) -> Result<Vec<u8>> {
        self.read()
            .sources
            .get(source)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(source.to_string()))
    }

    async fn write_source(&self, source: &str, bytes: &[u8]) -> Result<()> {
        self.write()
            .sources
            .insert(source.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn head(&self, source: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.read().heads.get(source).cloned())
    }

    async fn put_head(&self, source: &str, record: &[u8]) -> Result<()> {
        self.write()
            .heads
            .insert(source.to_string(), record.to_vec());
        Ok(())
    }

    async fn archive(&self, digest: &str, record: &[u8]) -> Result<ArchiveResult> {
        check_archive_key(digest, record)?;

        let mut inner = self.write();
        if inner.records.contains_key(digest) {
            return Ok(ArchiveResult::AlreadyExists);
        }
        inner.records.insert(digest.to_string(), record.to_vec());
        Ok(ArchiveResult::Inserted)
    }

    async fn archived(&self, digest: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.read().records.get(digest).cloned())
    }
}

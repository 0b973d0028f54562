//! The Workspace: unified API over a store of sources and their histories.
//!
//! The Workspace brings together storage and the pure core into the
//! operations a tool needs: commit a source, read its history, and verify
//! content, chains and documents.

use std::sync::Arc;

use chrono::Utc;
use medf_core::commit::{format_timestamp, DEFAULT_CONTENT_TYPE, LOCAL_SOURCE_PREFIX, RECORD_VERSION};
use medf_core::{
    digest, seal, sign_document, verify, verify_blocks, verify_content, verify_rooted_chain,
    verify_signature, BlockMismatch, ChainReport, CommitBuilder, CommitRecord, Document,
    Ed25519PublicKey, Keypair, VerificationResult,
};
use medf_store::{Store, StoreExt};
use tracing::{debug, info, warn};

use crate::error::{MedfError, Result};

/// Configuration for the Workspace.
#[derive(Debug, Clone)]
pub struct WorkspaceConfig {
    /// `medf_version` written into new commit records.
    pub record_version: String,
    /// `content_type` written into new commit records.
    pub content_type: String,
    /// Whether [`Workspace::load_document`] rejects documents whose
    /// `doc_hash` does not match.
    pub verify_on_load: bool,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            record_version: RECORD_VERSION.to_string(),
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            verify_on_load: true,
        }
    }
}

/// Outcome of checking a source against its head record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCheck {
    /// The head record the source was checked against.
    pub record: CommitRecord,
    /// Digest of the source bytes as they are now.
    pub actual: String,
    /// Does `actual` equal the record's `content_hash`?
    pub matches: bool,
}

/// The main Workspace struct.
///
/// Provides a unified API for:
/// - Committing sources and reading their histories
/// - Verifying sources against their head records
/// - Verifying hash chains
/// - Loading, sealing, signing and verifying documents
pub struct Workspace<S: Store> {
    /// The storage backend.
    store: Arc<S>,
    /// Configuration.
    config: WorkspaceConfig,
}

impl<S: Store> Workspace<S> {
    /// Create a new workspace.
    pub fn new(store: S, config: WorkspaceConfig) -> Self {
        Self {
            store: Arc::new(store),
            config,
        }
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get the configuration.
    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // History Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Commit the current bytes of `source`.
    ///
    /// The new record links to the current head, if any, and becomes the new
    /// head. Committing unchanged content still appends a record, since the
    /// intent is part of the history.
    pub async fn commit_source(
        &self,
        source: &str,
        author: &str,
        intent: &str,
    ) -> Result<CommitRecord> {
        let payload = self.store.read_source(source).await?;

        let previous = match self.head_record(source).await? {
            Some(head) => {
                let bytes = head.to_canonical_bytes();
                // Heads written by other tools may not be archived yet.
                self.store.archive(&digest(&bytes), &bytes).await?;
                Some(bytes)
            }
            None => None,
        };

        let record = CommitBuilder::new(source, &payload)
            .content_type(self.config.content_type.as_str())
            .source(format!("{}{}", LOCAL_SOURCE_PREFIX, source))
            .author(author)
            .intent(intent)
            .previous(previous.as_deref())
            .timestamp(Utc::now())
            .version(self.config.record_version.as_str())
            .build();

        let key = self.store.advance_head(source, &record.to_canonical_bytes()).await?;
        info!(
            source,
            record = %key,
            content = %record.document.content_hash,
            genesis = record.is_genesis(),
            "committed"
        );
        Ok(record)
    }

    /// Get the head record of a source.
    pub async fn head_record(&self, source: &str) -> Result<Option<CommitRecord>> {
        match self.store.head(source).await? {
            Some(bytes) => Ok(Some(CommitRecord::from_json(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Get the history of a source, oldest first.
    pub async fn history(&self, source: &str) -> Result<Vec<CommitRecord>> {
        Ok(self.store.load_history(source).await?)
    }

    /// Check the current bytes of `source` against its head record.
    pub async fn verify_source(&self, source: &str) -> Result<SourceCheck> {
        let record = self
            .head_record(source)
            .await?
            .ok_or_else(|| MedfError::NoHistory(source.to_string()))?;

        let payload = self.store.read_source(source).await?;
        let matches = verify_content(&payload, &record);
        let actual = digest(&payload);
        if !matches {
            warn!(
                source,
                expected = %record.document.content_hash,
                actual = %actual,
                "content does not match head record"
            );
        }

        Ok(SourceCheck {
            record,
            actual,
            matches,
        })
    }

    /// Verify the hash chain of a source back to its genesis record.
    ///
    /// A history cut short by a missing or forged link is not intact: the
    /// dangling link is reported in [`ChainReport::unresolved`].
    pub async fn verify_history(&self, source: &str) -> Result<ChainReport> {
        let records = self.history(source).await?;
        if records.is_empty() {
            return Err(MedfError::NoHistory(source.to_string()));
        }

        let report = verify_rooted_chain(&records);
        if let Some(broken) = &report.broken {
            warn!(
                source,
                index = broken.index,
                expected = ?broken.expected,
                actual = %broken.actual,
                "chain broken"
            );
        }
        if let Some(link) = &report.unresolved {
            warn!(source, len = records.len(), link = %link, "history does not reach a genesis record");
        }
        Ok(report)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Document Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Parse a document stored at `path`.
    ///
    /// With `verify_on_load`, a document whose `doc_hash` does not match is
    /// rejected. Documents without an envelope load either way.
    pub async fn load_document(&self, path: &str) -> Result<Document> {
        let document = self.read_document(path).await?;

        if self.config.verify_on_load {
            let result = verify(&document);
            if result.is_missing_envelope() {
                debug!(path, "loaded unsealed document");
            } else if !result.valid {
                return Err(MedfError::DigestMismatch {
                    source_name: path.to_string(),
                    expected: result.expected.unwrap_or_default(),
                    actual: result.actual.unwrap_or_default(),
                });
            }
        }
        Ok(document)
    }

    /// Verify the document stored at `path`.
    ///
    /// A mismatch is reported in the result, not as an error.
    pub async fn verify_document(&self, path: &str) -> Result<VerificationResult> {
        let document = self.read_document(path).await?;
        let result = verify(&document);
        debug!(path, valid = result.valid, "verified document");
        Ok(result)
    }

    /// Check stored block hashes of the document at `path`.
    pub async fn verify_document_blocks(&self, path: &str) -> Result<Vec<BlockMismatch>> {
        let document = self.read_document(path).await?;
        Ok(verify_blocks(&document))
    }

    /// Seal the document at `path` in place and return its new digest.
    pub async fn seal_document(&self, path: &str) -> Result<String> {
        let mut document = self.read_document(path).await?;
        let value = seal(&mut document);
        self.write_document(path, &document).await?;
        info!(path, doc_hash = %value, "sealed document");
        Ok(value)
    }

    /// Sign the sealed document at `path` in place.
    pub async fn sign_document(&self, path: &str, keypair: &Keypair) -> Result<()> {
        let mut document = self.read_document(path).await?;
        sign_document(&mut document, keypair, Some(format_timestamp(Utc::now())))?;
        self.write_document(path, &document).await?;
        info!(path, signer = ?keypair.public_key(), "signed document");
        Ok(())
    }

    /// Check the signature of the document at `path` and return the signer.
    pub async fn verify_document_signature(&self, path: &str) -> Result<Ed25519PublicKey> {
        let document = self.read_document(path).await?;
        Ok(verify_signature(&document)?)
    }

    /// Parse the document stored at `path` without checking it.
    pub async fn read_document(&self, path: &str) -> Result<Document> {
        let bytes = self.store.read_source(path).await?;
        Ok(Document::from_json(&bytes)?)
    }

    async fn write_document(&self, path: &str, document: &Document) -> Result<()> {
        let mut json = document.to_json_pretty()?;
        json.push('\n');
        self.store.write_source(path, json.as_bytes()).await?;
        Ok(())
    }
}

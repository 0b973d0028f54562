//! Filesystem implementation of the Store trait.
//!
//! Layout under the workspace root:
//!
//! ```text
//! notes/a.md                       source
//! notes/a.md.medf.json             head record of notes/a.md
//! .medf/records/<hex>.json         every record, by digest
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use medf_core::Sha256Digest;
use tokio::fs;
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::traits::{check_archive_key, ArchiveResult, Store};

/// Suffix appended to a source path to name its head record.
pub const HEAD_SUFFIX: &str = ".medf.json";

/// Directory, relative to the root, holding archived records.
pub const RECORDS_DIR: &str = ".medf/records";

/// Store rooted at a directory.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Open a store rooted at `root`. Nothing is created until written.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The workspace root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a source file.
    pub fn source_path(&self, source: &str) -> PathBuf {
        self.root.join(source)
    }

    /// Path of the head record of a source.
    pub fn head_path(&self, source: &str) -> PathBuf {
        self.root.join(format!("{source}{HEAD_SUFFIX}"))
    }

    /// Path of an archived record.
    pub fn record_path(&self, digest: &str) -> Result<PathBuf> {
        let hex = Sha256Digest::parse_tagged(digest)?.to_hex();
        Ok(self.root.join(RECORDS_DIR).join(format!("{hex}.json")))
    }
}

/// Read a file, mapping "does not exist" to `None`.
async fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Write a file through a sibling temp file so readers never see a partial
/// record.
async fn write_replace(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    fs::write(&tmp, bytes).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}

#[async_trait]
impl Store for FsStore {
    async fn read_source(&self, source: &str) -> Result<Vec<u8>> {
        read_optional(&self.source_path(source))
            .await?
            .ok_or_else(|| StoreError::NotFound(source.to_string()))
    }

    async fn write_source(&self, source: &str, bytes: &[u8]) -> Result<()> {
        write_replace(&self.source_path(source), bytes).await
    }

    async fn head(&self, source: &str) -> Result<Option<Vec<u8>>> {
        read_optional(&self.head_path(source)).await
    }

    async fn put_head(&self, source: &str, record: &[u8]) -> Result<()> {
        let path = self.head_path(source);
        write_replace(&path, record).await?;
        debug!(path = %path.display(), "wrote head record");
        Ok(())
    }

    async fn archive(&self, digest: &str, record: &[u8]) -> Result<ArchiveResult> {
        check_archive_key(digest, record)?;

        let path = self.record_path(digest)?;
        if fs::try_exists(&path).await? {
            return Ok(ArchiveResult::AlreadyExists);
        }
        write_replace(&path, record).await?;
        Ok(ArchiveResult::Inserted)
    }

    async fn archived(&self, digest: &str) -> Result<Option<Vec<u8>>> {
        read_optional(&self.record_path(digest)?).await
    }
}

//! Commit records: the hash-linked history of a source file.
//!
//! A commit record is immutable. A new revision never edits an old record; it
//! appends a new one whose `previous` field is the digest of the entire prior
//! record, so tampering with any earlier metadata breaks the chain.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::canonical::to_canonical_json;
use crate::crypto::digest;
use crate::error::{CoreError, Result};

/// Format version written into new commit records.
pub const RECORD_VERSION: &str = "0.1";

/// Content type used when the caller does not name one.
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// Scheme prefix of a local source locator.
pub const LOCAL_SOURCE_PREFIX: &str = "local:";

/// What was committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommittedContent {
    pub title: String,
    /// Tagged digest of the committed payload bytes.
    pub content_hash: String,
    pub content_type: String,
    /// Where the payload lives, e.g. `local:notes.md`.
    pub source: String,
}

/// Who committed and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    pub author: String,
    pub description: String,
}

/// A single link in a history chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub medf_version: String,
    pub document: CommittedContent,
    pub intent: Intent,
    /// RFC 3339 UTC, millisecond precision (`2026-10-17T09:30:00.000Z`).
    pub timestamp: String,
    /// Digest of the previous serialized record; `null` for the first commit.
    pub previous: Option<String>,
}

impl CommitRecord {
    /// The fixed serialization of a record.
    ///
    /// Stores persist exactly these bytes and [`verify_chain`] re-derives
    /// them, so a successor's `previous` link stays stable no matter how the
    /// record is later pretty-printed or reparsed.
    ///
    /// [`verify_chain`]: crate::verify::verify_chain
    pub fn to_canonical_bytes(&self) -> Vec<u8> {
        // Serializing plain strings and Option<String> into a Value cannot fail.
        let value = serde_json::to_value(self).unwrap_or_default();
        to_canonical_json(&value)
    }

    /// Digest of [`Self::to_canonical_bytes`]; what a successor links to.
    pub fn record_digest(&self) -> String {
        digest(&self.to_canonical_bytes())
    }

    /// Parse a record from JSON bytes (canonical or pretty-printed).
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let record: Self = serde_json::from_slice(bytes)?;
        if record.document.content_hash.is_empty() {
            return Err(CoreError::Malformed("empty content_hash".into()));
        }
        Ok(record)
    }

    /// Pretty-printed JSON for display.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Is this the first record of its chain?
    pub fn is_genesis(&self) -> bool {
        self.previous.is_none()
    }

    /// The local path named by the source locator, if it is a `local:` one.
    pub fn local_source(&self) -> Option<&str> {
        self.document.source.strip_prefix(LOCAL_SOURCE_PREFIX)
    }
}

/// Builder for commit records.
///
/// ```
/// use medf_core::CommitBuilder;
///
/// let record = CommitBuilder::new("notes.md", b"# Notes")
///     .author("alice")
///     .intent("first draft")
///     .build();
/// assert!(record.previous.is_none());
/// assert_eq!(record.document.source, "local:notes.md");
/// ```
#[derive(Debug, Clone)]
pub struct CommitBuilder<'a> {
    title: String,
    payload: &'a [u8],
    content_type: String,
    source: Option<String>,
    author: String,
    intent: String,
    previous_record: Option<&'a [u8]>,
    timestamp: Option<DateTime<Utc>>,
    version: String,
}

impl<'a> CommitBuilder<'a> {
    /// Start a commit of `payload` titled `title`.
    pub fn new(title: impl Into<String>, payload: &'a [u8]) -> Self {
        Self {
            title: title.into(),
            payload,
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            source: None,
            author: String::new(),
            intent: String::new(),
            previous_record: None,
            timestamp: None,
            version: RECORD_VERSION.to_string(),
        }
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Source locator. Defaults to `local:<title>`.
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn intent(mut self, description: impl Into<String>) -> Self {
        self.intent = description.into();
        self
    }

    /// Raw bytes of the record this commit follows.
    pub fn previous(mut self, previous_record: Option<&'a [u8]>) -> Self {
        self.previous_record = previous_record;
        self
    }

    /// Fix the timestamp instead of reading the clock.
    pub fn timestamp(mut self, at: DateTime<Utc>) -> Self {
        self.timestamp = Some(at);
        self
    }

    /// Override the record format version.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Hash the payload and the previous record and produce the record.
    pub fn build(self) -> CommitRecord {
        let source = self
            .source
            .unwrap_or_else(|| format!("{}{}", LOCAL_SOURCE_PREFIX, self.title));
        let at = self.timestamp.unwrap_or_else(Utc::now);

        CommitRecord {
            medf_version: self.version,
            document: CommittedContent {
                title: self.title,
                content_hash: digest(self.payload),
                content_type: self.content_type,
                source,
            },
            intent: Intent {
                author: self.author,
                description: self.intent,
            },
            timestamp: format_timestamp(at),
            previous: self.previous_record.map(digest),
        }
    }
}

/// Build a commit record stamped with the current time.
#[allow(clippy::too_many_arguments)]
pub fn commit(
    title: &str,
    payload: &[u8],
    content_type: &str,
    source: &str,
    author: &str,
    intent: &str,
    previous_record: Option<&[u8]>,
) -> CommitRecord {
    CommitBuilder::new(title, payload)
        .content_type(content_type)
        .source(source)
        .author(author)
        .intent(intent)
        .previous(previous_record)
        .build()
}

/// Render a timestamp in the sortable record format.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 14, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_first_commit_has_null_previous() {
        let record = CommitBuilder::new("a.txt", b"hello")
            .timestamp(fixed_time())
            .build();

        assert!(record.is_genesis());
        assert_eq!(record.document.content_hash, digest(b"hello"));
        assert_eq!(record.document.content_type, DEFAULT_CONTENT_TYPE);
        assert_eq!(record.local_source(), Some("a.txt"));
        assert_eq!(record.medf_version, RECORD_VERSION);
        assert_eq!(record.timestamp, "2026-01-14T12:00:00.000Z");
    }

    #[test]
    fn test_previous_covers_full_record_bytes() {
        let first = CommitBuilder::new("a.txt", b"v1")
            .author("alice")
            .timestamp(fixed_time())
            .build();
        let first_bytes = first.to_canonical_bytes();

        let second = CommitBuilder::new("a.txt", b"v2")
            .previous(Some(first_bytes.as_slice()))
            .timestamp(fixed_time())
            .build();
        assert_eq!(second.previous.as_deref(), Some(digest(&first_bytes).as_str()));
        assert_eq!(second.previous, Some(first.record_digest()));

        // Metadata-only change in the predecessor changes the link.
        let mut edited = first.clone();
        edited.intent.author = "mallory".into();
        assert_ne!(edited.record_digest(), first.record_digest());
        assert_eq!(edited.document.content_hash, first.document.content_hash);
    }

    #[test]
    fn test_commit_fn_matches_builder() {
        let record = commit(
            "report.md",
            b"body",
            "text/markdown",
            "local:docs/report.md",
            "bob",
            "fix typo",
            None,
        );
        assert_eq!(record.document.title, "report.md");
        assert_eq!(record.document.content_type, "text/markdown");
        assert_eq!(record.document.source, "local:docs/report.md");
        assert_eq!(record.intent.author, "bob");
        assert_eq!(record.intent.description, "fix typo");
        assert!(record.timestamp.ends_with('Z'));
    }

    #[test]
    fn test_canonical_bytes_layout() {
        let record = CommitBuilder::new("a.txt", b"")
            .author("alice")
            .intent("init")
            .timestamp(fixed_time())
            .build();
        let expected = format!(
            concat!(
                r#"{{"document":{{"content_hash":"{}","content_type":"text/plain","#,
                r#""source":"local:a.txt","title":"a.txt"}},"#,
                r#""intent":{{"author":"alice","description":"init"}},"#,
                r#""medf_version":"0.1","previous":null,"timestamp":"2026-01-14T12:00:00.000Z"}}"#
            ),
            digest(b"")
        );
        assert_eq!(String::from_utf8(record.to_canonical_bytes()).unwrap(), expected);
    }

    #[test]
    fn test_parse_pretty_record_gives_same_digest() {
        let record = CommitBuilder::new("a.txt", b"x")
            .timestamp(fixed_time())
            .build();
        let pretty = record.to_json_pretty().unwrap();
        let parsed = CommitRecord::from_json(pretty.as_bytes()).unwrap();
        assert_eq!(parsed.record_digest(), record.record_digest());
    }

    #[test]
    fn test_parse_rejects_missing_fields() {
        let result = CommitRecord::from_json(br#"{"medf_version":"0.1","timestamp":"t","previous":null}"#);
        assert!(matches!(result, Err(CoreError::Json(_))));
    }

    #[test]
    fn test_previous_key_always_present() {
        let record = CommitBuilder::new("a.txt", b"x").build();
        let text = String::from_utf8(record.to_canonical_bytes()).unwrap();
        assert!(text.contains(r#""previous":null"#));
    }
}

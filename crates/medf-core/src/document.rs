//! Document: an ordered sequence of text blocks plus an integrity envelope.
//!
//! The wire form is JSON. Unknown keys are kept in `extra` so that a document
//! can be read, sealed and written back without losing fields the core does
//! not know about (for example a viewer `index`). They are never hashed.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CoreError, Result};

/// Format version written by [`Document::template`].
pub const DOCUMENT_VERSION: &str = "0.2.1";

/// Algorithm label stored next to the document digest.
pub const DOC_HASH_ALGORITHM: &str = "sha-256";

/// A single block of text. Blocks are the citation anchors of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Unique within the document and stable across revisions.
    pub block_id: String,
    /// Semantic tag such as `heading`, `body` or `citation`.
    pub role: String,
    /// Content encoding such as `plain` or `markdown`.
    pub format: String,
    /// Raw, unrendered content.
    pub text: String,
    /// Digest of this block's canonical projection, if the document was sealed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_hash: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Block {
    pub fn new(
        block_id: impl Into<String>,
        role: impl Into<String>,
        format: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            block_id: block_id.into(),
            role: role.into(),
            format: format.into(),
            text: text.into(),
            block_hash: None,
            extra: BTreeMap::new(),
        }
    }
}

/// The claimed digest of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocHash {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
    pub value: String,
}

impl DocHash {
    /// An envelope claiming `value`, labelled `sha-256`.
    pub fn sha256(value: impl Into<String>) -> Self {
        Self {
            algorithm: Some(DOC_HASH_ALGORITHM.to_string()),
            value: value.into(),
        }
    }
}

/// A detached signature over `doc_hash.value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocSignature {
    pub algorithm: String,
    /// Hex-encoded signature bytes.
    pub value: String,
    /// Hex-encoded public key of the signer.
    pub public_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signed_at: Option<String>,
}

/// A MEDF document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medf_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub blocks: Vec<Block>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_hash: Option<DocHash>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<DocSignature>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Document {
    /// A document with the given blocks and no metadata.
    pub fn new(blocks: Vec<Block>) -> Self {
        Self {
            medf_version: None,
            id: None,
            snapshot: None,
            issuer: None,
            document_type: None,
            language: None,
            blocks,
            doc_hash: None,
            signature: None,
            extra: BTreeMap::new(),
        }
    }

    /// The starter document printed by `medf init`.
    pub fn template(snapshot: impl Into<String>) -> Self {
        Self::new(vec![Block::new("example", "body", "markdown", "Hello MEDF")])
            .with_version(DOCUMENT_VERSION)
            .with_id("example-doc")
            .with_snapshot(snapshot)
            .with_issuer("example")
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.medf_version = Some(version.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_snapshot(mut self, snapshot: impl Into<String>) -> Self {
        self.snapshot = Some(snapshot.into());
        self
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn with_document_type(mut self, document_type: impl Into<String>) -> Self {
        self.document_type = Some(document_type.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_doc_hash(mut self, value: impl Into<String>) -> Self {
        self.doc_hash = Some(DocHash {
            algorithm: None,
            value: value.into(),
        });
        self
    }

    /// Parse a document from JSON bytes.
    ///
    /// Fails with a typed error when the shape is unusable: invalid JSON, a
    /// missing `blocks` array, a block without one of its four fields, or two
    /// blocks sharing a `block_id`.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let document: Self = serde_json::from_slice(bytes)?;
        document.check_block_ids()?;
        Ok(document)
    }

    /// Pretty-printed JSON, the on-disk form of a document.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Look up a block by its identifier.
    pub fn block(&self, block_id: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.block_id == block_id)
    }

    /// Reject documents whose blocks do not have unique identifiers.
    pub fn check_block_ids(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.blocks.len());
        for block in &self.blocks {
            if !seen.insert(block.block_id.as_str()) {
                return Err(CoreError::DuplicateBlockId(block.block_id.clone()));
            }
        }
        Ok(())
    }

    /// The claimed digest, if the document carries an envelope.
    pub fn claimed_digest(&self) -> Option<&str> {
        self.doc_hash.as_ref().map(|h| h.value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "medf_version": "0.2.1",
        "id": "notice-7",
        "snapshot": "2026-02-04T10:00:00Z",
        "issuer": "JP-MLIT",
        "document_type": "public_notice",
        "language": "ja",
        "index": {"title": "Notice"},
        "blocks": [
            {"block_id": "b1", "role": "heading", "format": "plain", "text": "Notice", "note": 1},
            {"block_id": "b2", "role": "body", "format": "markdown", "text": "Body"}
        ],
        "doc_hash": {"algorithm": "sha-256", "value": "sha256:00"}
    }"#;

    #[test]
    fn test_parse_full_document() {
        let doc = Document::from_json(SAMPLE.as_bytes()).unwrap();
        assert_eq!(doc.id.as_deref(), Some("notice-7"));
        assert_eq!(doc.language.as_deref(), Some("ja"));
        assert_eq!(doc.blocks.len(), 2);
        assert_eq!(doc.block("b2").unwrap().format, "markdown");
        assert_eq!(doc.claimed_digest(), Some("sha256:00"));
        assert!(doc.extra.contains_key("index"));
        assert!(doc.blocks[0].extra.contains_key("note"));
    }

    #[test]
    fn test_unknown_fields_survive_roundtrip() {
        let doc = Document::from_json(SAMPLE.as_bytes()).unwrap();
        let json = doc.to_json_pretty().unwrap();
        let again = Document::from_json(json.as_bytes()).unwrap();
        assert_eq!(doc, again);
    }

    #[test]
    fn test_missing_blocks_is_malformed() {
        let result = Document::from_json(br#"{"id": "x"}"#);
        assert!(matches!(result, Err(CoreError::Json(_))));
    }

    #[test]
    fn test_block_missing_text_is_malformed() {
        let result =
            Document::from_json(br#"{"blocks": [{"block_id": "a", "role": "body", "format": "plain"}]}"#);
        assert!(matches!(result, Err(CoreError::Json(_))));
    }

    #[test]
    fn test_duplicate_block_id_rejected() {
        let result = Document::from_json(
            br#"{"blocks": [
                {"block_id": "a", "role": "body", "format": "plain", "text": "1"},
                {"block_id": "a", "role": "body", "format": "plain", "text": "2"}
            ]}"#,
        );
        assert!(matches!(result, Err(CoreError::DuplicateBlockId(id)) if id == "a"));
    }

    #[test]
    fn test_not_json_is_malformed() {
        assert!(matches!(
            Document::from_json(b"not json"),
            Err(CoreError::Json(_))
        ));
    }

    #[test]
    fn test_template() {
        let doc = Document::template("2026-10-17T00:00:00Z");
        assert_eq!(doc.medf_version.as_deref(), Some(DOCUMENT_VERSION));
        assert_eq!(doc.blocks.len(), 1);
        assert!(doc.doc_hash.is_none());
        assert!(doc.document_type.is_none());
    }
}

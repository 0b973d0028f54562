//! Verification: recompute digests and compare them against claims.
//!
//! Every check here is a pure function of its arguments. A failed check is a
//! value, not an error: callers get both the claimed and the recomputed
//! digest so they can show what went wrong.

use serde::Serialize;

use crate::canonical::{canonicalize, canonicalize_block};
use crate::commit::CommitRecord;
use crate::crypto::digest;
use crate::document::Document;

/// Error text reported for a document without an integrity envelope.
pub const NO_DOCUMENT_HASH: &str = "no document hash";

/// Outcome of verifying a document's envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationResult {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VerificationResult {
    fn missing_envelope() -> Self {
        Self {
            valid: false,
            expected: None,
            actual: None,
            error: Some(NO_DOCUMENT_HASH.to_string()),
        }
    }

    /// Did verification fail because the document made no claim at all?
    pub fn is_missing_envelope(&self) -> bool {
        self.error.as_deref() == Some(NO_DOCUMENT_HASH)
    }
}

/// Verify a document's `doc_hash` against its recomputed digest.
///
/// A document without an envelope is never valid. Digests are compared as
/// exact strings: no prefix, case or whitespace normalization.
pub fn verify(document: &Document) -> VerificationResult {
    let Some(expected) = document.claimed_digest() else {
        return VerificationResult::missing_envelope();
    };

    let actual = digest(&canonicalize(document));
    VerificationResult {
        valid: actual == expected,
        expected: Some(expected.to_string()),
        actual: Some(actual),
        error: None,
    }
}

/// A block whose stored `block_hash` no longer matches its content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockMismatch {
    pub block_id: String,
    pub expected: String,
    pub actual: String,
}

/// Check every block that carries a `block_hash`.
///
/// Blocks without a stored hash are skipped. Returns the mismatches in block
/// order; an empty vector means every stored block hash holds.
pub fn verify_blocks(document: &Document) -> Vec<BlockMismatch> {
    document
        .blocks
        .iter()
        .filter_map(|block| {
            let expected = block.block_hash.as_deref()?;
            let actual = digest(&canonicalize_block(block));
            (actual != expected).then(|| BlockMismatch {
                block_id: block.block_id.clone(),
                expected: expected.to_string(),
                actual,
            })
        })
        .collect()
}

/// Does `content` hash to the record's declared `content_hash`?
///
/// Only the content claim is checked; the `previous` link is left to
/// [`verify_chain`].
pub fn verify_content(content: &[u8], record: &CommitRecord) -> bool {
    digest(content) == record.document.content_hash
}

/// A link that does not hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainBreak {
    /// Index of the record whose digest differs from what its successor
    /// recorded in `previous`.
    pub index: usize,
    /// The successor's `previous` value (`None` if it claims to be a genesis
    /// record).
    pub expected: Option<String>,
    /// Recomputed digest of the record at `index`.
    pub actual: String,
}

/// Outcome of walking a sequence of records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainReport {
    /// Number of records examined.
    pub len: usize,
    /// Index of the last record reachable from the start through intact
    /// links. `None` only for an empty sequence.
    pub valid_up_to: Option<usize>,
    /// The first broken link, if any.
    pub broken: Option<ChainBreak>,
    /// `previous` of the oldest record when a full history was expected to
    /// end at a genesis record but does not.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unresolved: Option<String>,
}

impl ChainReport {
    /// True when every link holds and, for a full history, the oldest
    /// record is a genesis record.
    pub fn is_intact(&self) -> bool {
        self.broken.is_none() && self.unresolved.is_none()
    }
}

/// Verify a sequence of records, oldest first.
///
/// For every `i`, checks `records[i + 1].previous ==
/// digest(records[i].to_canonical_bytes())` and stops at the first link that
/// does not hold. The first record's own `previous` is not inspected, so a
/// window cut from the middle of a history verifies too.
pub fn verify_chain(records: &[CommitRecord]) -> ChainReport {
    if records.is_empty() {
        return ChainReport {
            len: 0,
            valid_up_to: None,
            broken: None,
            unresolved: None,
        };
    }

    for (i, pair) in records.windows(2).enumerate() {
        let actual = pair[0].record_digest();
        if pair[1].previous.as_deref() != Some(actual.as_str()) {
            return ChainReport {
                len: records.len(),
                valid_up_to: Some(i),
                broken: Some(ChainBreak {
                    index: i,
                    expected: pair[1].previous.clone(),
                    actual,
                }),
                unresolved: None,
            };
        }
    }

    ChainReport {
        len: records.len(),
        valid_up_to: Some(records.len() - 1),
        broken: None,
        unresolved: None,
    }
}

/// Verify a complete history, oldest first.
///
/// Like [`verify_chain`], but the first record must also be a genesis
/// record. A history whose oldest record still links to something was cut
/// short, whether by a missing archive entry or a forged link, and is
/// reported through [`ChainReport::unresolved`].
pub fn verify_rooted_chain(records: &[CommitRecord]) -> ChainReport {
    let mut report = verify_chain(records);
    report.unresolved = records.first().and_then(|first| first.previous.clone());
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::CommitBuilder;
    use crate::document::{Block, DocSignature};
    use crate::envelope::seal;

    fn sealed_doc() -> Document {
        let mut doc = Document::new(vec![Block::new("b1", "body", "plain", "hello")]).with_id("doc1");
        let claim = digest(&canonicalize(&doc));
        doc = doc.with_doc_hash(claim);
        doc
    }

    fn chain(n: usize) -> Vec<CommitRecord> {
        let mut records: Vec<CommitRecord> = Vec::with_capacity(n);
        for i in 0..n {
            let prev_bytes = records.last().map(|r| r.to_canonical_bytes());
            let payload = format!("revision {i}");
            let record = CommitBuilder::new("notes.md", payload.as_bytes())
                .author("alice")
                .intent(format!("edit {i}"))
                .previous(prev_bytes.as_deref())
                .build();
            records.push(record);
        }
        records
    }

    #[test]
    fn test_end_to_end_example() {
        let doc = sealed_doc();
        let result = verify(&doc);
        assert!(result.valid);
        assert!(result.error.is_none());

        let mut tampered = doc.clone();
        tampered.blocks[0].text = "hellO".into();
        let result = verify(&tampered);
        assert!(!result.valid);
        assert_ne!(result.expected, result.actual);
        assert_eq!(result.expected, doc.doc_hash.map(|h| h.value));
    }

    #[test]
    fn test_no_envelope_is_not_valid() {
        let doc = Document::new(vec![Block::new("b1", "body", "plain", "hello")]);
        let result = verify(&doc);
        assert!(!result.valid);
        assert_eq!(result.error.as_deref(), Some("no document hash"));
        assert!(result.is_missing_envelope());
        assert!(result.expected.is_none());
    }

    #[test]
    fn test_comparison_is_exact() {
        let doc = sealed_doc();
        let value = doc.claimed_digest().unwrap().to_string();

        let upper = doc.clone().with_doc_hash(value.to_uppercase());
        assert!(!verify(&upper).valid);

        let bare = doc.clone().with_doc_hash(value.trim_start_matches("sha256:"));
        assert!(!verify(&bare).valid);

        let padded = doc.with_doc_hash(format!("{value} "));
        assert!(!verify(&padded).valid);
    }

    #[test]
    fn test_signature_excluded_from_digest() {
        let doc = sealed_doc();
        let mut signed = doc.clone();
        signed.signature = Some(DocSignature {
            algorithm: "ed25519".into(),
            value: "00".into(),
            public_key: "00".into(),
            signed_at: None,
        });
        assert!(verify(&signed).valid);
        assert_eq!(verify(&signed).actual, verify(&doc).actual);
    }

    #[test]
    fn test_verify_is_idempotent() {
        let doc = sealed_doc();
        assert_eq!(verify(&doc), verify(&doc));
    }

    #[test]
    fn test_verify_blocks() {
        let mut doc = Document::new(vec![
            Block::new("a", "heading", "plain", "Title"),
            Block::new("b", "body", "plain", "Text"),
            Block::new("c", "body", "plain", "More"),
        ]);
        seal(&mut doc);
        doc.blocks[2].block_hash = None;
        assert!(verify_blocks(&doc).is_empty());

        doc.blocks[1].text = "Changed".into();
        let mismatches = verify_blocks(&doc);
        assert_eq!(mismatches.len(), 1);
        assert_eq!(mismatches[0].block_id, "b");
        assert_ne!(mismatches[0].expected, mismatches[0].actual);
    }

    #[test]
    fn test_verify_content() {
        let record = CommitBuilder::new("a.txt", b"contents").build();
        assert!(verify_content(b"contents", &record));
        assert!(!verify_content(b"contents\n", &record));
    }

    #[test]
    fn test_intact_chain() {
        let records = chain(5);
        let report = verify_chain(&records);
        assert!(report.is_intact());
        assert_eq!(report.len, 5);
        assert_eq!(report.valid_up_to, Some(4));
    }

    #[test]
    fn test_empty_and_single_chain() {
        let report = verify_chain(&[]);
        assert!(report.is_intact());
        assert_eq!(report.valid_up_to, None);

        let report = verify_chain(&chain(1));
        assert!(report.is_intact());
        assert_eq!(report.valid_up_to, Some(0));
    }

    #[test]
    fn test_corrupted_record_breaks_at_its_index() {
        for corrupt in 0..4 {
            let mut records = chain(5);
            records[corrupt].intent.description = "rewritten".into();

            let report = verify_chain(&records);
            let broken = report.broken.expect("chain must break");
            assert_eq!(broken.index, corrupt);
            assert_eq!(report.valid_up_to, Some(corrupt));
            assert_eq!(broken.expected, records[corrupt + 1].previous);

            // Every link before the corrupted record still holds.
            assert!(verify_chain(&records[..=corrupt]).is_intact());
        }
    }

    #[test]
    fn test_missing_link_is_a_break() {
        let mut records = chain(3);
        records[2].previous = None;
        let report = verify_chain(&records);
        let broken = report.broken.unwrap();
        assert_eq!(broken.index, 1);
        assert_eq!(broken.expected, None);
    }

    #[test]
    fn test_window_from_middle_verifies() {
        let records = chain(6);
        assert!(verify_chain(&records[2..]).is_intact());
    }

    #[test]
    fn test_rooted_chain_requires_genesis() {
        let records = chain(4);
        let report = verify_rooted_chain(&records);
        assert!(report.is_intact());
        assert_eq!(report.unresolved, None);

        // The same window that verify_chain accepts is not a full history.
        let report = verify_rooted_chain(&records[2..]);
        assert!(!report.is_intact());
        assert!(report.broken.is_none());
        assert_eq!(report.unresolved, Some(records[1].record_digest()));
        assert_eq!(report.valid_up_to, Some(1));

        assert!(verify_rooted_chain(&[]).is_intact());
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn blocks() -> impl Strategy<Value = Vec<Block>> {
            prop::collection::vec(("[a-z]{1,6}", "\\PC{0,16}"), 1..6).prop_map(|items| {
                items
                    .into_iter()
                    .enumerate()
                    .map(|(i, (role, text))| Block::new(format!("b{i}"), role, "plain", text))
                    .collect()
            })
        }

        proptest! {
            #[test]
            fn test_sealed_document_verifies(blocks in blocks()) {
                let mut doc = Document::new(blocks);
                seal(&mut doc);
                prop_assert!(verify(&doc).valid);
            }

            #[test]
            fn test_any_text_edit_is_detected(
                blocks in blocks(),
                pick in any::<prop::sample::Index>(),
                suffix in "\\PC{1,4}",
            ) {
                let mut doc = Document::new(blocks);
                seal(&mut doc);
                let i = pick.index(doc.blocks.len());
                doc.blocks[i].text.push_str(&suffix);
                prop_assert!(!verify(&doc).valid);
            }

            #[test]
            fn test_unknown_fields_never_hashed(
                blocks in blocks(),
                key in "x_[a-z]{1,8}",
                value in "\\PC{0,8}",
            ) {
                let mut doc = Document::new(blocks);
                seal(&mut doc);
                doc.extra.insert(key.clone(), serde_json::Value::String(value.clone()));
                doc.blocks[0].extra.insert(key, serde_json::Value::String(value));
                prop_assert!(verify(&doc).valid);
            }
        }
    }
}

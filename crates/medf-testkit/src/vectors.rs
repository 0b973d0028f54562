//! Golden test vectors for deterministic verification.
//!
//! Expected bytes and digests come from the reference encoder,
//! `json.dumps(v, sort_keys=True, separators=(",", ":"), ensure_ascii=False)`
//! followed by SHA-256. Any implementation must reproduce them exactly.

use chrono::{TimeZone, Utc};
use medf_core::{canonicalize, canonicalize_block, digest, CommitBuilder, CommitRecord, Document};

/// A golden document vector.
#[derive(Debug, Clone)]
pub struct DocumentVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Document as it appears on the wire.
    pub json: &'static str,
    /// Expected canonical bytes, as UTF-8.
    pub canonical: &'static str,
    /// Expected document digest.
    pub digest: &'static str,
    /// Expected `(block_id, block digest)` pairs in block order.
    pub blocks: &'static [(&'static str, &'static str)],
}

impl DocumentVector {
    /// Parse the vector's wire form.
    pub fn document(&self) -> Document {
        Document::from_json(self.json.as_bytes())
            .unwrap_or_else(|e| panic!("vector '{}' does not parse: {e}", self.name))
    }
}

/// Get all golden document vectors.
pub fn document_vectors() -> Vec<DocumentVector> {
    vec![
        DocumentVector {
            name: "minimal",
            json: r#"{"id": "doc1", "blocks": [{"block_id": "b1", "role": "body", "format": "plain", "text": "hello"}]}"#,
            canonical: r#"{"blocks":[{"block_id":"b1","format":"plain","role":"body","text":"hello"}],"id":"doc1"}"#,
            digest: "sha256:b0f8b46216e7f8e049f8d47c71e9bdab711a4996281b2339ac030c65d4eda8fd",
            blocks: &[(
                "b1",
                "sha256:fb258852c3233ada51a6383f88546fd67631505e9baa4ed86c53c0cc78558c63",
            )],
        },
        DocumentVector {
            name: "empty blocks",
            json: r#"{"blocks": []}"#,
            canonical: r#"{"blocks":[]}"#,
            digest: "sha256:6265055fb526dd105a7b3bb34ad42c83cbfe47d8a1ed82de234687ee92df4d2c",
            blocks: &[],
        },
        DocumentVector {
            name: "full metadata with envelope and unknown fields",
            json: r#"{
                "medf_version": "0.2.1",
                "id": "notice-2026-014",
                "snapshot": "2026-01-14T12:00:00Z",
                "issuer": "JP-MLIT",
                "document_type": "public_notice",
                "language": "ja",
                "index": {"title": "道路閉鎖のお知らせ"},
                "blocks": [
                    {"block_id": "title", "role": "heading", "format": "plain", "text": "道路閉鎖のお知らせ"},
                    {"block_id": "body", "role": "body", "format": "markdown", "text": "**国道1号**は1月20日に閉鎖されます。", "block_hash": "sha256:0000"}
                ],
                "doc_hash": {"algorithm": "sha-256", "value": "sha256:ffff"},
                "signature": {"algorithm": "ed25519", "value": "00", "public_key": "00"}
            }"#,
            canonical: concat!(
                r#"{"blocks":[{"block_id":"title","format":"plain","role":"heading","text":"道路閉鎖のお知らせ"},"#,
                r#"{"block_id":"body","format":"markdown","role":"body","text":"**国道1号**は1月20日に閉鎖されます。"}],"#,
                r#""document_type":"public_notice","id":"notice-2026-014","issuer":"JP-MLIT","language":"ja","#,
                r#""medf_version":"0.2.1","snapshot":"2026-01-14T12:00:00Z"}"#
            ),
            digest: "sha256:ac417b4149fab089905f1a793ffc90f8225d50e354997d82b24df952b5245b85",
            blocks: &[
                (
                    "title",
                    "sha256:b6ee54638588c4c6b42eaf7f109e9ee51752c401771cc7ac958e4e24aa6f4d2e",
                ),
                (
                    "body",
                    "sha256:b2fbe9dfda838ec089c56506a0345f339cc31b0b1602d21b7c83fb86e81b55ad",
                ),
            ],
        },
        DocumentVector {
            name: "escapes and non-ASCII",
            json: r#"{"id": "esc", "blocks": [{"block_id": "q", "role": "body", "format": "plain", "text": "say \"hi\"\\ back\nslash\ttab\u0001ctl \u007f del é 😀"}]}"#,
            canonical: "{\"blocks\":[{\"block_id\":\"q\",\"format\":\"plain\",\"role\":\"body\",\"text\":\"say \\\"hi\\\"\\\\ back\\nslash\\ttab\\u0001ctl \u{7f} del é 😀\"}],\"id\":\"esc\"}",
            digest: "sha256:8996adf9865e315289cda001e82ef36df8686f978fd159ee1fcaebad21b6287e",
            blocks: &[(
                "q",
                "sha256:00362dcfdfeab778a279b1d3ad557f5e1b6cb84fbaa247c2a333a37cddb9369f",
            )],
        },
        DocumentVector {
            name: "block order preserved",
            json: r#"{"id": "order", "blocks": [{"block_id": "b", "role": "body", "format": "plain", "text": "second"}, {"block_id": "a", "role": "body", "format": "plain", "text": "first"}]}"#,
            canonical: r#"{"blocks":[{"block_id":"b","format":"plain","role":"body","text":"second"},{"block_id":"a","format":"plain","role":"body","text":"first"}],"id":"order"}"#,
            digest: "sha256:27f9277605dd6f42a38685661dd6511d44d5cff3540f5f70200e6fc427b8ea83",
            blocks: &[
                (
                    "b",
                    "sha256:b412e5bbd333abbe85ac997a375e87ec1fcae0f938042a97f32431eca5102f95",
                ),
                (
                    "a",
                    "sha256:1a1aa9bf74be07e9ee7bd3873fbf6c796c66323d57fbf2aae8e9077d8b50f9d6",
                ),
            ],
        },
    ]
}

/// A golden commit record vector.
#[derive(Debug, Clone)]
pub struct RecordVector {
    pub name: &'static str,
    pub title: &'static str,
    pub payload: &'static [u8],
    pub author: &'static str,
    pub intent: &'static str,
    /// Seconds since the epoch.
    pub timestamp: i64,
    /// Index of the predecessor vector, if any.
    pub previous: Option<usize>,
    /// Expected canonical record bytes, as UTF-8.
    pub canonical: &'static str,
    /// Expected record digest.
    pub digest: &'static str,
}

/// Get all golden record vectors, oldest first. Together they form a chain.
pub fn record_vectors() -> Vec<RecordVector> {
    vec![
        RecordVector {
            name: "genesis",
            title: "notes.md",
            payload: b"# Notes\n",
            author: "alice",
            intent: "first draft",
            timestamp: 1_768_392_000, // 2026-01-14T12:00:00Z
            previous: None,
            canonical: concat!(
                r#"{"document":{"content_hash":"sha256:365d0b84ae63c2afc293dedd2b00bdf0dc8d6ef70c9297d90f9e5682ab0d72ee","#,
                r#""content_type":"text/plain","source":"local:notes.md","title":"notes.md"},"#,
                r#""intent":{"author":"alice","description":"first draft"},"#,
                r#""medf_version":"0.1","previous":null,"timestamp":"2026-01-14T12:00:00.000Z"}"#
            ),
            digest: "sha256:9b742050f656fb3561807d1c9b084e00cc110737999c7356018e8ede86871001",
        },
        RecordVector {
            name: "second revision",
            title: "notes.md",
            payload: b"# Notes\n\nSecond.\n",
            author: "alice",
            intent: "add paragraph",
            timestamp: 1_768_392_300, // 2026-01-14T12:05:00Z
            previous: Some(0),
            canonical: concat!(
                r#"{"document":{"content_hash":"sha256:50eb6dd96cf48840afa997ba5960b67fbe4d37d3c9fd741360448913293673f0","#,
                r#""content_type":"text/plain","source":"local:notes.md","title":"notes.md"},"#,
                r#""intent":{"author":"alice","description":"add paragraph"},"#,
                r#""medf_version":"0.1","#,
                r#""previous":"sha256:9b742050f656fb3561807d1c9b084e00cc110737999c7356018e8ede86871001","#,
                r#""timestamp":"2026-01-14T12:05:00.000Z"}"#
            ),
            digest: "sha256:c66818e366176488f82059777ce961355a844044394709e880d9eceb62d3f7db",
        },
    ]
}

/// Build the records described by [`record_vectors`], linking each to its
/// predecessor's canonical bytes.
pub fn generate_records() -> Vec<CommitRecord> {
    let vectors = record_vectors();
    let mut records: Vec<CommitRecord> = Vec::with_capacity(vectors.len());

    for vector in &vectors {
        let previous = vector.previous.map(|i| records[i].to_canonical_bytes());
        let at = Utc
            .timestamp_opt(vector.timestamp, 0)
            .single()
            .unwrap_or_else(|| panic!("vector '{}' has an invalid timestamp", vector.name));
        let record = CommitBuilder::new(vector.title, vector.payload)
            .author(vector.author)
            .intent(vector.intent)
            .previous(previous.as_deref())
            .timestamp(at)
            .build();
        records.push(record);
    }
    records
}

/// Check every vector and report `(name, matches, actual digest)`.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    let documents = document_vectors().into_iter().map(|v| {
        let doc = v.document();
        let bytes = canonicalize(&doc);
        let actual = digest(&bytes);
        let blocks_match = doc.blocks.len() == v.blocks.len()
            && doc
                .blocks
                .iter()
                .zip(v.blocks)
                .all(|(b, (id, d))| b.block_id == *id && digest(&canonicalize_block(b)) == *d);
        let matches = bytes == v.canonical.as_bytes() && actual == v.digest && blocks_match;
        (v.name.to_string(), matches, actual)
    });

    let records = record_vectors()
        .into_iter()
        .zip(generate_records())
        .map(|(v, record)| {
            let bytes = record.to_canonical_bytes();
            let actual = digest(&bytes);
            let matches = bytes == v.canonical.as_bytes() && actual == v.digest;
            (v.name.to_string(), matches, actual)
        });

    documents.chain(records).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_vectors_match() {
        for (name, matches, actual) in verify_all_vectors() {
            assert!(matches, "vector '{name}' mismatch: got {actual}");
        }
    }

    #[test]
    fn test_record_vectors_form_a_chain() {
        let records = generate_records();
        let report = medf_core::verify_chain(&records);
        assert!(report.is_intact());
        assert_eq!(records[1].previous.as_deref(), Some(record_vectors()[0].digest));
    }

    #[test]
    fn test_vectors_are_deterministic() {
        for vector in document_vectors() {
            assert_eq!(
                canonicalize(&vector.document()),
                canonicalize(&vector.document()),
                "vector '{}' produced different canonical bytes",
                vector.name
            );
        }
    }
}

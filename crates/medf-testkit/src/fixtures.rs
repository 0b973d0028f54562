//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use chrono::{DateTime, Duration, TimeZone, Utc};
use medf_core::commit::format_timestamp;
use medf_core::{seal, sign_document, Block, CommitBuilder, CommitRecord, Document, Keypair};
use medf_store::MemoryStore;

/// A sealed public-notice style document with every metadata field set.
pub fn sample_document() -> Document {
    let mut document = Document::new(vec![
        Block::new("title", "heading", "plain", "Road closure"),
        Block::new(
            "body",
            "body",
            "markdown",
            "Route 1 is closed on **20 January** between 09:00 and 17:00.",
        ),
        Block::new("ref", "citation", "plain", "Road Act, art. 46"),
    ])
    .with_version("0.2.1")
    .with_id("notice-2026-014")
    .with_snapshot("2026-01-14T12:00:00Z")
    .with_issuer("JP-MLIT")
    .with_document_type("public_notice")
    .with_language("en");
    seal(&mut document);
    document
}

/// Pretty JSON bytes of a document, the on-disk form.
pub fn document_bytes(document: &Document) -> Vec<u8> {
    match document.to_json_pretty() {
        Ok(json) => json.into_bytes(),
        Err(e) => panic!("fixture document does not serialize: {e}"),
    }
}

/// A test fixture with a keypair and builds of linked commit records.
pub struct TestFixture {
    pub keypair: Keypair,
    pub author: String,
    /// Timestamp of the first commit; later commits are one minute apart.
    pub start: DateTime<Utc>,
}

impl TestFixture {
    /// Create a new test fixture with a random keypair.
    pub fn new() -> Self {
        Self::with_keypair(Keypair::generate())
    }

    /// Create with a deterministic keypair from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self::with_keypair(Keypair::from_seed(&seed))
    }

    fn with_keypair(keypair: Keypair) -> Self {
        Self {
            keypair,
            author: "alice".to_string(),
            start: Utc
                .with_ymd_and_hms(2026, 1, 14, 12, 0, 0)
                .single()
                .unwrap_or_else(Utc::now),
        }
    }

    /// Build `n` linked records committing `revision 0 .. revision n-1`.
    pub fn chain(&self, title: &str, n: usize) -> Vec<CommitRecord> {
        let payloads: Vec<String> = (0..n).map(|i| format!("revision {i}")).collect();
        self.chain_of(title, payloads.iter().map(String::as_bytes))
    }

    /// Build linked records committing each payload in turn.
    pub fn chain_of<'p>(
        &self,
        title: &str,
        payloads: impl IntoIterator<Item = &'p [u8]>,
    ) -> Vec<CommitRecord> {
        let mut records: Vec<CommitRecord> = Vec::new();
        for (i, payload) in payloads.into_iter().enumerate() {
            let previous = records.last().map(CommitRecord::to_canonical_bytes);
            let record = CommitBuilder::new(title, payload)
                .author(self.author.as_str())
                .intent(format!("edit {i}"))
                .previous(previous.as_deref())
                .timestamp(self.start + Duration::minutes(i as i64))
                .build();
            records.push(record);
        }
        records
    }

    /// `sample_document()` signed with the fixture keypair.
    pub fn signed_sample(&self) -> Document {
        let mut document = sample_document();
        let signed_at = format_timestamp(self.start);
        if let Err(e) = sign_document(&mut document, &self.keypair, Some(signed_at)) {
            panic!("sealed fixture document cannot be signed: {e}");
        }
        document
    }

    /// A memory store holding `sample_document()` at `doc.json`.
    pub fn store_with_sample(&self) -> MemoryStore {
        MemoryStore::with_sources([("doc.json", document_bytes(&sample_document()))])
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

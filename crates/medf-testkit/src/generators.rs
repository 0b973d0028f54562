//! Proptest generators for property-based testing.

use proptest::prelude::*;

use medf_core::{Block, CommitBuilder, CommitRecord, Document, Keypair};

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Text that exercises the canonical encoder: printable ASCII, arbitrary
/// Unicode, and control characters.
pub fn text() -> impl Strategy<Value = String> {
    prop_oneof![
        "[ -~]{0,40}",
        "\\PC{0,24}",
        "[\\x00-\\x1f\"\\\\a-z]{0,16}",
    ]
}

/// Generate a block role.
pub fn role() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("heading".to_string()),
        Just("body".to_string()),
        Just("citation".to_string()),
        "[a-z_]{1,12}",
    ]
}

/// Generate a block format.
pub fn format() -> impl Strategy<Value = String> {
    prop_oneof![Just("plain".to_string()), Just("markdown".to_string())]
}

/// Generate up to `max` blocks with unique identifiers `b0, b1, ...`.
pub fn blocks(max: usize) -> impl Strategy<Value = Vec<Block>> {
    prop::collection::vec((role(), format(), text()), 0..=max).prop_map(|items| {
        items
            .into_iter()
            .enumerate()
            .map(|(i, (role, format, text))| Block::new(format!("b{i}"), role, format, text))
            .collect()
    })
}

/// Parameters for generating a document.
#[derive(Debug, Clone)]
pub struct DocumentParams {
    pub medf_version: Option<String>,
    pub id: Option<String>,
    pub snapshot: Option<String>,
    pub issuer: Option<String>,
    pub document_type: Option<String>,
    pub language: Option<String>,
    pub blocks: Vec<Block>,
}

impl Arbitrary for DocumentParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            proptest::option::of(Just("0.2.1".to_string())),
            proptest::option::of("[a-z0-9-]{1,16}"),
            proptest::option::of("20[0-9]{2}-[01][0-9]-[0-3][0-9]T00:00:00Z"),
            proptest::option::of("[A-Z]{2}-[A-Z]{2,6}"),
            proptest::option::of("[a-z_]{1,16}"),
            proptest::option::of("[a-z]{2}"),
            blocks(6),
        )
            .prop_map(
                |(medf_version, id, snapshot, issuer, document_type, language, blocks)| {
                    DocumentParams {
                        medf_version,
                        id,
                        snapshot,
                        issuer,
                        document_type,
                        language,
                        blocks,
                    }
                },
            )
            .boxed()
    }
}

/// Build a document from parameters.
pub fn document_from_params(params: &DocumentParams) -> Document {
    let mut document = Document::new(params.blocks.clone());
    document.medf_version = params.medf_version.clone();
    document.id = params.id.clone();
    document.snapshot = params.snapshot.clone();
    document.issuer = params.issuer.clone();
    document.document_type = params.document_type.clone();
    document.language = params.language.clone();
    document
}

/// Generate a linked chain of 1 to `max` commit records.
pub fn chain(max: usize) -> impl Strategy<Value = Vec<CommitRecord>> {
    prop::collection::vec(("[a-z]{1,8}", text(), any::<Vec<u8>>()), 1..=max).prop_map(|revisions| {
        let mut records: Vec<CommitRecord> = Vec::with_capacity(revisions.len());
        for (author, intent, payload) in revisions {
            let previous = records.last().map(CommitRecord::to_canonical_bytes);
            let record = CommitBuilder::new("doc.md", &payload)
                .author(author)
                .intent(intent)
                .previous(previous.as_deref())
                .build();
            records.push(record);
        }
        records
    })
}

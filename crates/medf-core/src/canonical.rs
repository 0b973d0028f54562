//! Canonical JSON encoding for deterministic serialization.
//!
//! Documents and commit records are hashed over canonical JSON:
//! - Object keys sorted by their UTF-8 bytes, at every level
//! - Arrays keep their order
//! - No insignificant whitespace
//! - Non-ASCII text emitted as raw UTF-8; only `"`, `\` and control
//!   characters are escaped
//!
//! The output is byte-identical to Python's
//! `json.dumps(v, sort_keys=True, separators=(",", ":"), ensure_ascii=False)`,
//! which is what the reference tooling hashes.
//!
//! **CRITICAL**: This encoding is FROZEN. Changing it invalidates every
//! published `doc_hash` and every `previous` link.

use serde_json::{Map, Value};

use crate::document::{Block, Document};

/// Document keys that take part in the document digest.
mod keys {
    pub const MEDF_VERSION: &str = "medf_version";
    pub const ID: &str = "id";
    pub const SNAPSHOT: &str = "snapshot";
    pub const ISSUER: &str = "issuer";
    pub const DOCUMENT_TYPE: &str = "document_type";
    pub const LANGUAGE: &str = "language";
    pub const BLOCKS: &str = "blocks";

    pub const BLOCK_ID: &str = "block_id";
    pub const ROLE: &str = "role";
    pub const FORMAT: &str = "format";
    pub const TEXT: &str = "text";
}

/// Canonical bytes of a document: the only input to its digest.
///
/// Exactly `medf_version, id, snapshot, issuer, document_type, language,
/// blocks` are selected. Absent optional fields are left out rather than
/// written as `null`. `doc_hash`, `signature`, block hashes and unknown keys
/// never reach the encoder.
pub fn canonicalize(document: &Document) -> Vec<u8> {
    let mut map = Map::new();

    let optional = [
        (keys::MEDF_VERSION, &document.medf_version),
        (keys::ID, &document.id),
        (keys::SNAPSHOT, &document.snapshot),
        (keys::ISSUER, &document.issuer),
        (keys::DOCUMENT_TYPE, &document.document_type),
        (keys::LANGUAGE, &document.language),
    ];
    for (key, field) in optional {
        if let Some(value) = field {
            map.insert(key.to_string(), Value::String(value.clone()));
        }
    }

    let blocks = document.blocks.iter().map(block_projection).collect();
    map.insert(keys::BLOCKS.to_string(), Value::Array(blocks));

    to_canonical_json(&Value::Object(map))
}

/// Canonical bytes of a single block projection, the input to `block_hash`.
pub fn canonicalize_block(block: &Block) -> Vec<u8> {
    to_canonical_json(&block_projection(block))
}

fn block_projection(block: &Block) -> Value {
    let mut map = Map::new();
    map.insert(keys::BLOCK_ID.to_string(), Value::String(block.block_id.clone()));
    map.insert(keys::ROLE.to_string(), Value::String(block.role.clone()));
    map.insert(keys::FORMAT.to_string(), Value::String(block.format.clone()));
    map.insert(keys::TEXT.to_string(), Value::String(block.text.clone()));
    Value::Object(map)
}

/// Encode any JSON value to canonical bytes.
///
/// This is the single encoder shared by the document digest, the block
/// digest and commit record serialization.
pub fn to_canonical_json(value: &Value) -> Vec<u8> {
    let mut buf = Vec::new();
    encode_value(&mut buf, value);
    buf
}

/// Recursively encode a JSON value.
fn encode_value(buf: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Null => buf.extend_from_slice(b"null"),
        Value::Bool(true) => buf.extend_from_slice(b"true"),
        Value::Bool(false) => buf.extend_from_slice(b"false"),
        // Documents and records only carry strings; numbers keep serde_json's
        // shortest representation.
        Value::Number(n) => buf.extend_from_slice(n.to_string().as_bytes()),
        Value::String(s) => encode_text(buf, s),
        Value::Array(items) => encode_array(buf, items),
        Value::Object(entries) => encode_object(buf, entries),
    }
}

/// Encode a string with minimal escaping.
fn encode_text(buf: &mut Vec<u8>, s: &str) {
    const HEX: &[u8; 16] = b"0123456789abcdef";

    buf.push(b'"');
    let mut start = 0;
    for (i, byte) in s.bytes().enumerate() {
        let escape: &[u8] = match byte {
            b'"' => b"\\\"",
            b'\\' => b"\\\\",
            b'\n' => b"\\n",
            b'\r' => b"\\r",
            b'\t' => b"\\t",
            0x08 => b"\\b",
            0x0c => b"\\f",
            0x00..=0x1f => &[],
            _ => continue,
        };

        buf.extend_from_slice(&s.as_bytes()[start..i]);
        if escape.is_empty() {
            buf.extend_from_slice(b"\\u00");
            buf.push(HEX[(byte >> 4) as usize]);
            buf.push(HEX[(byte & 0x0f) as usize]);
        } else {
            buf.extend_from_slice(escape);
        }
        start = i + 1;
    }
    buf.extend_from_slice(&s.as_bytes()[start..]);
    buf.push(b'"');
}

fn encode_array(buf: &mut Vec<u8>, items: &[Value]) {
    buf.push(b'[');
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            buf.push(b',');
        }
        encode_value(buf, item);
    }
    buf.push(b']');
}

/// Encode an object with keys sorted by byte comparison.
///
/// Sorting happens here rather than relying on the map's iteration order, so
/// the output does not depend on serde_json's `preserve_order` feature.
fn encode_object(buf: &mut Vec<u8>, entries: &Map<String, Value>) {
    let mut sorted: Vec<(&String, &Value)> = entries.iter().collect();
    sorted.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

    buf.push(b'{');
    for (i, (key, value)) in sorted.into_iter().enumerate() {
        if i > 0 {
            buf.push(b',');
        }
        encode_text(buf, key);
        buf.push(b':');
        encode_value(buf, value);
    }
    buf.push(b'}');
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn encode(value: Value) -> String {
        String::from_utf8(to_canonical_json(&value)).unwrap()
    }

    #[test]
    fn test_keys_sorted_at_every_level() {
        let value = json!({"b": 1, "a": {"z": true, "m": null}, "c": [{"y": "1", "x": "2"}]});
        assert_eq!(
            encode(value),
            r#"{"a":{"m":null,"z":true},"b":1,"c":[{"x":"2","y":"1"}]}"#
        );
    }

    #[test]
    fn test_arrays_keep_order() {
        assert_eq!(encode(json!(["b", "a", "c"])), r#"["b","a","c"]"#);
    }

    #[test]
    fn test_escaping_matches_reference() {
        let value = json!("quote\" back\\ nl\n tab\t cr\r bs\u{8} ff\u{c} nul\u{0} us\u{1f}");
        assert_eq!(
            encode(value),
            r#""quote\" back\\ nl\n tab\t cr\r bs\b ff\f nul\u0000 us\u001f""#
        );
    }

    #[test]
    fn test_non_ascii_is_raw() {
        let value = json!({"text": "こんにちは é \u{7f} 😀"});
        assert_eq!(encode(value), "{\"text\":\"こんにちは é \u{7f} 😀\"}");
    }

    #[test]
    fn test_key_sort_is_bytewise() {
        // Uppercase sorts before lowercase, shorter prefix first.
        let value = json!({"ab": 1, "B": 2, "a": 3});
        assert_eq!(encode(value), r#"{"B":2,"a":3,"ab":1}"#);
    }

    #[test]
    fn test_canonical_document_shape() {
        let doc = Document::new(vec![Block::new("b1", "body", "plain", "hello")]).with_id("doc1");
        assert_eq!(
            String::from_utf8(canonicalize(&doc)).unwrap(),
            r#"{"blocks":[{"block_id":"b1","format":"plain","role":"body","text":"hello"}],"id":"doc1"}"#
        );
    }

    #[test]
    fn test_empty_blocks_is_valid() {
        let doc = Document::new(vec![]);
        assert_eq!(canonicalize(&doc), br#"{"blocks":[]}"#.to_vec());
    }

    #[test]
    fn test_block_projection() {
        let mut block = Block::new("intro", "heading", "markdown", "# Title");
        block.block_hash = Some("sha256:ignored".into());
        assert_eq!(
            String::from_utf8(canonicalize_block(&block)).unwrap(),
            r##"{"block_id":"intro","format":"markdown","role":"heading","text":"# Title"}"##
        );
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn text() -> impl Strategy<Value = String> {
            prop_oneof![
                "[ -~]{0,24}",
                "\\PC{0,12}",
                prop::collection::vec(0u8..0x20, 0..6)
                    .prop_map(|b| b.into_iter().map(char::from).collect()),
            ]
        }

        proptest! {
            #[test]
            fn test_output_parses_back_to_same_value(
                entries in prop::collection::btree_map(text(), text(), 0..8)
            ) {
                let value = Value::Object(
                    entries.into_iter().map(|(k, v)| (k, Value::String(v))).collect(),
                );
                let bytes = to_canonical_json(&value);
                let parsed: Value = serde_json::from_slice(&bytes).unwrap();
                prop_assert_eq!(parsed, value);
            }

            #[test]
            fn test_insertion_order_irrelevant(
                entries in prop::collection::vec((text(), text()), 0..8)
            ) {
                let forward: Map<String, Value> = entries
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect();
                let mut reversed = Map::new();
                for (k, v) in forward.iter().rev() {
                    reversed.insert(k.clone(), v.clone());
                }
                prop_assert_eq!(
                    to_canonical_json(&Value::Object(forward)),
                    to_canonical_json(&Value::Object(reversed))
                );
            }

            #[test]
            fn test_no_raw_control_bytes(s in text()) {
                let bytes = to_canonical_json(&Value::String(s));
                prop_assert!(bytes.iter().all(|&b| b >= 0x20));
            }
        }
    }
}

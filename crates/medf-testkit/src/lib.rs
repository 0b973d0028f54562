//! # MEDF Testkit
//!
//! Testing utilities for MEDF.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known documents and records with expected canonical bytes and digests
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Helpers for setting up documents, chains and stores
//!
//! ## Golden Vectors
//!
//! ```rust
//! use medf_testkit::vectors::verify_all_vectors;
//!
//! for (name, matches, digest) in verify_all_vectors() {
//!     assert!(matches, "{name}: {digest}");
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use medf_testkit::generators::{document_from_params, DocumentParams};
//!
//! proptest! {
//!     #[test]
//!     fn digest_is_deterministic(params: DocumentParams) {
//!         let d1 = medf_core::digest(&medf_core::canonicalize(&document_from_params(&params)));
//!         let d2 = medf_core::digest(&medf_core::canonicalize(&document_from_params(&params)));
//!         prop_assert_eq!(d1, d2);
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use medf_testkit::fixtures::TestFixture;
//!
//! let fixture = TestFixture::new();
//! let records = fixture.chain("notes.md", 3);
//! assert!(medf_core::verify_chain(&records).is_intact());
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{document_bytes, sample_document, TestFixture};
pub use generators::{document_from_params, DocumentParams};
pub use vectors::{document_vectors, generate_records, record_vectors, verify_all_vectors};

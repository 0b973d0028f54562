//! Integrity envelope: sealing and signing documents.
//!
//! Sealing writes a `block_hash` into every block and a `doc_hash` claim into
//! the document. Signing covers the UTF-8 bytes of `doc_hash.value`, so a
//! signature stays valid exactly as long as the claim it signs.

use crate::canonical::{canonicalize, canonicalize_block};
use crate::crypto::{digest, Ed25519PublicKey, Ed25519Signature, Keypair};
use crate::document::{DocHash, DocSignature, Document};
use crate::error::{CoreError, Result};

/// Algorithm label stored in [`DocSignature::algorithm`].
pub const SIGNATURE_ALGORITHM: &str = "ed25519";

/// Compute and store all block hashes and the document digest.
///
/// Returns the new `doc_hash` value. Any existing signature is dropped since
/// it no longer covers the new claim.
pub fn seal(document: &mut Document) -> String {
    for block in &mut document.blocks {
        block.block_hash = Some(digest(&canonicalize_block(block)));
    }

    let value = digest(&canonicalize(document));
    if document.claimed_digest() != Some(value.as_str()) {
        document.signature = None;
    }
    document.doc_hash = Some(DocHash::sha256(value.clone()));
    value
}

/// Sign the document's digest claim.
///
/// The document must already carry a `doc_hash`; sealing is a separate step
/// so that signing never silently changes the claim.
pub fn sign_document(
    document: &mut Document,
    keypair: &Keypair,
    signed_at: Option<String>,
) -> Result<()> {
    let claim = document
        .claimed_digest()
        .ok_or(CoreError::MissingEnvelope)?;
    let signature = keypair.sign(claim.as_bytes());

    document.signature = Some(DocSignature {
        algorithm: SIGNATURE_ALGORITHM.to_string(),
        value: signature.to_hex(),
        public_key: keypair.public_key().to_hex(),
        signed_at,
    });
    Ok(())
}

/// Verify the document's signature against its `doc_hash.value`.
///
/// Returns the signer's public key on success. This checks only that the
/// claim was signed; whether the claim matches the content is
/// [`verify`](crate::verify::verify)'s job.
pub fn verify_signature(document: &Document) -> Result<Ed25519PublicKey> {
    let claim = document
        .claimed_digest()
        .ok_or(CoreError::MissingEnvelope)?;
    let signature = document
        .signature
        .as_ref()
        .ok_or(CoreError::MissingSignature)?;

    if signature.algorithm != SIGNATURE_ALGORITHM {
        return Err(CoreError::UnsupportedAlgorithm(signature.algorithm.clone()));
    }

    let public_key = Ed25519PublicKey::from_hex(&signature.public_key)?;
    let sig = Ed25519Signature::from_hex(&signature.value)?;
    public_key.verify(claim.as_bytes(), &sig)?;
    Ok(public_key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Block;
    use crate::verify::{verify, verify_blocks};

    fn doc() -> Document {
        Document::new(vec![
            Block::new("h", "heading", "plain", "Notice"),
            Block::new("p", "body", "markdown", "Road closed on *Friday*."),
        ])
        .with_id("notice-1")
        .with_language("en")
    }

    #[test]
    fn test_seal_then_verify() {
        let mut d = doc();
        let value = seal(&mut d);

        let envelope = d.doc_hash.as_ref().unwrap();
        assert_eq!(envelope.value, value);
        assert_eq!(envelope.algorithm.as_deref(), Some("sha-256"));
        assert!(d.blocks.iter().all(|b| b.block_hash.is_some()));
        assert!(verify(&d).valid);
        assert!(verify_blocks(&d).is_empty());
    }

    #[test]
    fn test_block_hashes_do_not_affect_doc_hash() {
        let mut sealed = doc();
        let value = seal(&mut sealed);
        assert_eq!(value, digest(&canonicalize(&doc())));
    }

    #[test]
    fn test_seal_is_idempotent() {
        let mut d = doc();
        let first = seal(&mut d);
        let second = seal(&mut d);
        assert_eq!(first, second);
    }

    #[test]
    fn test_sign_and_verify() {
        let keypair = Keypair::from_seed(&[0x11; 32]);
        let mut d = doc();
        seal(&mut d);
        sign_document(&mut d, &keypair, Some("2026-10-17T00:00:00Z".into())).unwrap();

        let signer = verify_signature(&d).unwrap();
        assert_eq!(signer, keypair.public_key());
        // The signature is outside the digest.
        assert!(verify(&d).valid);
    }

    #[test]
    fn test_sign_requires_envelope() {
        let keypair = Keypair::from_seed(&[0x11; 32]);
        let mut d = doc();
        assert!(matches!(
            sign_document(&mut d, &keypair, None),
            Err(CoreError::MissingEnvelope)
        ));
    }

    #[test]
    fn test_signature_bound_to_claim() {
        let keypair = Keypair::from_seed(&[0x22; 32]);
        let mut d = doc();
        seal(&mut d);
        sign_document(&mut d, &keypair, None).unwrap();

        d.blocks[1].text = "Road open.".into();
        let mut resealed = d.clone();
        resealed.doc_hash = None;
        seal(&mut resealed);
        assert!(resealed.signature.is_none());

        // Swapping the claim without re-signing breaks the signature.
        let new_claim = resealed.doc_hash.unwrap().value;
        d.doc_hash = Some(DocHash::sha256(new_claim));
        assert!(matches!(
            verify_signature(&d),
            Err(CoreError::InvalidSignature)
        ));
    }

    #[test]
    fn test_unsigned_and_unknown_algorithm() {
        let mut d = doc();
        seal(&mut d);
        assert!(matches!(
            verify_signature(&d),
            Err(CoreError::MissingSignature)
        ));

        sign_document(&mut d, &Keypair::from_seed(&[0x33; 32]), None).unwrap();
        if let Some(sig) = d.signature.as_mut() {
            sig.algorithm = "rsa".into();
        }
        assert!(matches!(
            verify_signature(&d),
            Err(CoreError::UnsupportedAlgorithm(a)) if a == "rsa"
        ));
    }
}

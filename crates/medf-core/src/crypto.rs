//! Cryptographic primitives: SHA-256 digests and Ed25519 signing.
//!
//! Digests are rendered in a namespaced text form, `sha256:<64 hex>`, so the
//! algorithm can be migrated later without ambiguity.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, Result};

/// Namespace prefix of a tagged SHA-256 digest.
pub const SHA256_PREFIX: &str = "sha256:";

/// Length of a tagged digest string: prefix + 64 hex characters.
pub const TAGGED_DIGEST_LEN: usize = SHA256_PREFIX.len() + 64;

/// Compute the tagged SHA-256 digest of `data`.
///
/// ```
/// let d = medf_core::digest(b"");
/// assert_eq!(d, "sha256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855");
/// ```
pub fn digest(data: &[u8]) -> String {
    Sha256Digest::hash(data).to_string()
}

/// A 32-byte SHA-256 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Sha256Digest(pub [u8; 32]);

impl Sha256Digest {
    /// Compute the SHA-256 digest of data.
    pub fn hash(data: &[u8]) -> Self {
        Self(Sha256::digest(data).into())
    }

    /// Lowercase hex without the namespace prefix.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse a tagged digest (`sha256:<hex>`).
    ///
    /// Only the lowercase form produced by [`digest`] is accepted, since
    /// digests are compared as exact strings.
    pub fn parse_tagged(s: &str) -> Result<Self> {
        let invalid = |reason| CoreError::InvalidDigest {
            value: s.to_string(),
            reason,
        };

        let hex_part = s
            .strip_prefix(SHA256_PREFIX)
            .ok_or_else(|| invalid("missing sha256: prefix"))?;
        if hex_part.len() != 64 {
            return Err(invalid("expected 64 hex characters"));
        }
        if hex_part.bytes().any(|b| b.is_ascii_uppercase()) {
            return Err(invalid("hex must be lowercase"));
        }

        let mut arr = [0u8; 32];
        hex::decode_to_slice(hex_part, &mut arr).map_err(|_| invalid("not hex"))?;
        Ok(Self(arr))
    }
}

impl fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", SHA256_PREFIX, self.to_hex())
    }
}

impl fmt::Debug for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sha256({})", &self.to_hex()[..16])
    }
}

impl FromStr for Sha256Digest {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_tagged(s)
    }
}

impl AsRef<[u8]> for Sha256Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// A 32-byte Ed25519 public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ed25519PublicKey(pub [u8; 32]);

impl Ed25519PublicKey {
    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self> {
        let mut arr = [0u8; 32];
        hex::decode_to_slice(s, &mut arr).map_err(|_| CoreError::InvalidPublicKey)?;
        Ok(Self(arr))
    }

    /// Verify a signature over a message.
    pub fn verify(&self, message: &[u8], signature: &Ed25519Signature) -> Result<()> {
        let verifying_key =
            VerifyingKey::from_bytes(&self.0).map_err(|_| CoreError::InvalidPublicKey)?;
        let sig = Signature::from_bytes(&signature.0);

        verifying_key
            .verify(message, &sig)
            .map_err(|_| CoreError::InvalidSignature)
    }
}

impl fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519Pub({})", &self.to_hex()[..16])
    }
}

/// A 64-byte Ed25519 signature.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Ed25519Signature(pub [u8; 64]);

impl Ed25519Signature {
    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self> {
        let mut arr = [0u8; 64];
        hex::decode_to_slice(s, &mut arr).map_err(|_| CoreError::InvalidSignature)?;
        Ok(Self(arr))
    }
}

impl fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519Sig({})", &self.to_hex()[..16])
    }
}

/// An Ed25519 keypair for signing documents.
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        Self {
            signing_key: SigningKey::generate(&mut rng),
        }
    }

    /// Create from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// The 32-byte secret seed.
    pub fn seed(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }

    /// Parse a hex-encoded 32-byte seed, the on-disk form of a key file.
    pub fn from_seed_hex(s: &str) -> Result<Self> {
        let mut seed = [0u8; 32];
        hex::decode_to_slice(s.trim(), &mut seed).map_err(|_| {
            CoreError::Malformed("key seed must be 64 hex characters".into())
        })?;
        Ok(Self::from_seed(&seed))
    }

    /// The seed as lowercase hex.
    pub fn seed_hex(&self) -> String {
        hex::encode(self.seed())
    }

    /// Get the public key.
    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign a message.
    pub fn sign(&self, message: &[u8]) -> Ed25519Signature {
        Ed25519Signature(self.signing_key.sign(message).to_bytes())
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keypair({:?})", self.public_key())
    }
}

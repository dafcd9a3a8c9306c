//! Cryptographic primitives for credledger.
//!
//! Wraps Ed25519 signing with strong types. Record signatures are always
//! taken over the 32 digest bytes, never over the payload directly.

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{decode_hex_array, Digest};

/// Ed25519 verifying key carried by every signed record.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKey(pub [u8; 32]);

impl PublicKey {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse the `public_key` field of a persisted record.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        decode_hex_array(s).map(Self)
    }

    /// Verify a signature over arbitrary bytes.
    ///
    /// Fails closed: a key that is not a valid curve point yields `false`.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        VerifyingKey::from_bytes(&self.0)
            .map(|key| {
                key.verify(message, &ed25519_dalek::Signature::from_bytes(&signature.0))
                    .is_ok()
            })
            .unwrap_or(false)
    }

    /// Verify a record signature, which always covers the 32 digest bytes.
    pub fn verify_digest(&self, digest: &Digest, signature: &Signature) -> bool {
        self.verify(digest.as_bytes(), signature)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", &self.to_hex()[..16])
    }
}

/// Detached Ed25519 signature over a record digest.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature(pub [u8; 64]);

impl Signature {
    pub const fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse the `signature` field of a persisted record.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        decode_hex_array(s).map(Self)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({}..)", &self.to_hex()[..16])
    }
}

/// The operator's signing key.
///
/// Held by whoever appends records. Only the public half ever reaches a
/// ledger.
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut rand::thread_rng()),
        }
    }

    /// Restore from the 32-byte seed written by [`Keypair::seed`].
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign arbitrary bytes.
    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature(self.signing_key.sign(message).to_bytes())
    }

    /// Sign a record digest.
    pub fn sign_digest(&self, digest: &Digest) -> Signature {
        self.sign(digest.as_bytes())
    }

    /// Secret seed, for persisting the key.
    pub fn seed(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}

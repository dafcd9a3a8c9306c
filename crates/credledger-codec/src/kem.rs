//! Key encapsulation over X25519.
//!
//! The sender generates an ephemeral key pair, performs Diffie-Hellman with
//! the recipient's static public key, and ships the ephemeral public key as
//! the encapsulation. The recipient repeats the exchange with its static
//! secret. Both sides then derive the same [`SharedSecret`] with BLAKE3.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use x25519_dalek::{EphemeralSecret, PublicKey, StaticSecret};

use crate::aead::{SymmetricKey, KEY_LENGTH};
use crate::error::{CodecError, Result};

/// Key derivation context for the shared secret.
const KEM_CONTEXT: &str = "credledger-kem-v1 shared secret";

/// Length of an encapsulation (an X25519 public key).
pub const KEM_CIPHERTEXT_LENGTH: usize = 32;

/// The recipient's X25519 public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KemPublicKey(pub [u8; 32]);

impl KemPublicKey {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    fn to_dalek(self) -> PublicKey {
        PublicKey::from(self.0)
    }

    /// Encapsulate a fresh shared secret to this key.
    ///
    /// Returns the secret and the ciphertext the recipient needs to recover it.
    pub fn encapsulate(&self) -> Result<(SharedSecret, KemCiphertext)> {
        let ephemeral = EphemeralSecret::random_from_rng(rand::thread_rng());
        let ephemeral_public = PublicKey::from(&ephemeral);

        let dh = ephemeral.diffie_hellman(&self.to_dalek());
        if !dh.was_contributory() {
            return Err(CodecError::Encryption(
                "recipient key produced a non-contributory exchange".into(),
            ));
        }

        let ciphertext = KemCiphertext(*ephemeral_public.as_bytes());
        let secret = SharedSecret::derive(dh.as_bytes(), &ciphertext.0, &self.0);
        Ok((secret, ciphertext))
    }
}

/// The recipient's X25519 static secret.
pub struct KemSecretKey(StaticSecret);

impl KemSecretKey {
    /// Generate a new random secret.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(StaticSecret::from(bytes))
    }

    /// Restore from stored bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(StaticSecret::from(bytes))
    }

    /// Get the raw bytes for storage.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    /// Derive the public key.
    pub fn public_key(&self) -> KemPublicKey {
        KemPublicKey(*PublicKey::from(&self.0).as_bytes())
    }

    /// Recover the shared secret from an encapsulation.
    pub fn decapsulate(&self, ciphertext: &KemCiphertext) -> Result<SharedSecret> {
        let dh = self.0.diffie_hellman(&PublicKey::from(ciphertext.0));
        if !dh.was_contributory() {
            return Err(CodecError::Decryption(
                "encapsulation produced a non-contributory exchange".into(),
            ));
        }
        Ok(SharedSecret::derive(
            dh.as_bytes(),
            &ciphertext.0,
            self.public_key().as_bytes(),
        ))
    }
}

impl std::fmt::Debug for KemSecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KemSecretKey")
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}

/// Encapsulated key material (the sender's ephemeral public key).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KemCiphertext(pub [u8; KEM_CIPHERTEXT_LENGTH]);

impl KemCiphertext {
    /// Parse from a byte slice.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; KEM_CIPHERTEXT_LENGTH] = bytes.try_into().map_err(|_| {
            CodecError::EnvelopeFormat(format!(
                "kem ciphertext must be {KEM_CIPHERTEXT_LENGTH} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(arr))
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; KEM_CIPHERTEXT_LENGTH] {
        &self.0
    }
}

/// A 32-byte secret shared between sender and recipient.
#[derive(Clone, PartialEq, Eq)]
pub struct SharedSecret([u8; 32]);

impl SharedSecret {
    fn derive(dh: &[u8; 32], ciphertext: &[u8; 32], recipient: &[u8; 32]) -> Self {
        let mut hasher = blake3::Hasher::new_derive_key(KEM_CONTEXT);
        hasher.update(dh);
        hasher.update(ciphertext);
        hasher.update(recipient);
        Self(*hasher.finalize().as_bytes())
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// The symmetric key: the first 16 bytes of the secret.
    pub fn symmetric_key(&self) -> SymmetricKey {
        let mut key = [0u8; KEY_LENGTH];
        key.copy_from_slice(&self.0[..KEY_LENGTH]);
        SymmetricKey::from_bytes(key)
    }
}

impl std::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SharedSecret(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encapsulate_decapsulate_agree() {
        let recipient = KemSecretKey::generate();
        let (sent, ct) = recipient.public_key().encapsulate().unwrap();
        let received = recipient.decapsulate(&ct).unwrap();
        assert_eq!(sent, received);
    }

    #[test]
    fn test_each_encapsulation_is_fresh() {
        let recipient = KemSecretKey::generate();
        let (a, ct_a) = recipient.public_key().encapsulate().unwrap();
        let (b, ct_b) = recipient.public_key().encapsulate().unwrap();
        assert_ne!(ct_a, ct_b);
        assert_ne!(a, b);
    }

    #[test]
    fn test_wrong_recipient_derives_different_secret() {
        let alice = KemSecretKey::generate();
        let mallory = KemSecretKey::generate();
        let (sent, ct) = alice.public_key().encapsulate().unwrap();
        let wrong = mallory.decapsulate(&ct).unwrap();
        assert_ne!(sent, wrong);
    }

    #[test]
    fn test_secret_key_roundtrip() {
        let sk = KemSecretKey::generate();
        let restored = KemSecretKey::from_bytes(sk.to_bytes());
        assert_eq!(sk.public_key(), restored.public_key());
    }

    #[test]
    fn test_low_order_point_rejected() {
        let recipient = KemSecretKey::generate();
        let zero = KemCiphertext([0u8; 32]);
        assert!(matches!(
            recipient.decapsulate(&zero),
            Err(CodecError::Decryption(_))
        ));
    }

    #[test]
    fn test_ciphertext_length_checked() {
        assert!(KemCiphertext::from_slice(&[0u8; 31]).is_err());
        assert!(KemCiphertext::from_slice(&[0u8; 32]).is_ok());
    }

    #[test]
    fn test_symmetric_key_is_prefix() {
        let recipient = KemSecretKey::generate();
        let (secret, _) = recipient.public_key().encapsulate().unwrap();
        assert_eq!(
            secret.symmetric_key().as_bytes(),
            &secret.as_bytes()[..KEY_LENGTH]
        );
    }
}

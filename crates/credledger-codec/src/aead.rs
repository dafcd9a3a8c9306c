//! AES-128-GCM with a detached authentication tag.

use aes_gcm::{
    aead::{AeadInPlace, KeyInit},
    Aes128Gcm,
};
use rand::RngCore;

use crate::error::{CodecError, Result};

/// Key length in bytes (128 bits).
pub const KEY_LENGTH: usize = 16;

/// Nonce length in bytes (96 bits).
pub const NONCE_LENGTH: usize = 12;

/// Authentication tag length in bytes.
pub const TAG_LENGTH: usize = 16;

/// A 128-bit symmetric key.
#[derive(Clone)]
pub struct SymmetricKey([u8; KEY_LENGTH]);

impl SymmetricKey {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; KEY_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.0
    }

    fn cipher(&self) -> Aes128Gcm {
        Aes128Gcm::new(&self.0.into())
    }
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SymmetricKey(..)")
    }
}

/// A 96-bit nonce, random per encryption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nonce(pub [u8; NONCE_LENGTH]);

impl Nonce {
    /// Generate a random nonce.
    pub fn generate() -> Self {
        let mut bytes = [0u8; NONCE_LENGTH];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Parse from a byte slice.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; NONCE_LENGTH] = bytes.try_into().map_err(|_| {
            CodecError::EnvelopeFormat(format!(
                "nonce must be {NONCE_LENGTH} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(arr))
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; NONCE_LENGTH] {
        &self.0
    }
}

/// A detached 128-bit authentication tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag(pub [u8; TAG_LENGTH]);

impl Tag {
    /// Parse from a byte slice.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; TAG_LENGTH] = bytes.try_into().map_err(|_| {
            CodecError::EnvelopeFormat(format!(
                "tag must be {TAG_LENGTH} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(arr))
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; TAG_LENGTH] {
        &self.0
    }
}

/// Encrypt `plaintext`, returning the ciphertext and its tag.
pub fn encrypt(key: &SymmetricKey, nonce: &Nonce, plaintext: &[u8]) -> Result<(Vec<u8>, Tag)> {
    let mut buffer = plaintext.to_vec();
    let tag = key
        .cipher()
        .encrypt_in_place_detached(&nonce.0.into(), b"", &mut buffer)
        .map_err(|e| CodecError::Encryption(e.to_string()))?;

    let mut out = [0u8; TAG_LENGTH];
    out.copy_from_slice(tag.as_slice());
    Ok((buffer, Tag(out)))
}

/// Verify the tag and decrypt.
///
/// Any modification of the ciphertext, nonce or tag fails authentication.
pub fn decrypt(key: &SymmetricKey, nonce: &Nonce, ciphertext: &[u8], tag: &Tag) -> Result<Vec<u8>> {
    let mut buffer = ciphertext.to_vec();
    key.cipher()
        .decrypt_in_place_detached(&nonce.0.into(), b"", &mut buffer, &tag.0.into())
        .map_err(|_| CodecError::Decryption("authentication tag mismatch".into()))?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> SymmetricKey {
        SymmetricKey::from_bytes([0x42; KEY_LENGTH])
    }

    #[test]
    fn test_encrypt_decrypt() {
        let nonce = Nonce::generate();
        let (ct, tag) = encrypt(&key(), &nonce, b"fragment bytes").unwrap();
        assert_eq!(ct.len(), b"fragment bytes".len());
        assert_eq!(decrypt(&key(), &nonce, &ct, &tag).unwrap(), b"fragment bytes");
    }

    #[test]
    fn test_flipped_ciphertext_fails() {
        let nonce = Nonce::generate();
        let (mut ct, tag) = encrypt(&key(), &nonce, b"fragment bytes").unwrap();
        ct[0] ^= 0x01;
        assert!(matches!(
            decrypt(&key(), &nonce, &ct, &tag),
            Err(CodecError::Decryption(_))
        ));
    }

    #[test]
    fn test_wrong_tag_fails() {
        let nonce = Nonce::generate();
        let (ct, mut tag) = encrypt(&key(), &nonce, b"data").unwrap();
        tag.0[15] ^= 0xff;
        assert!(decrypt(&key(), &nonce, &ct, &tag).is_err());
    }

    #[test]
    fn test_wrong_nonce_fails() {
        let (ct, tag) = encrypt(&key(), &Nonce([1; NONCE_LENGTH]), b"data").unwrap();
        assert!(decrypt(&key(), &Nonce([2; NONCE_LENGTH]), &ct, &tag).is_err());
    }

    #[test]
    fn test_wrong_key_fails() {
        let nonce = Nonce::generate();
        let (ct, tag) = encrypt(&key(), &nonce, b"data").unwrap();
        let other = SymmetricKey::from_bytes([0x07; KEY_LENGTH]);
        assert!(decrypt(&other, &nonce, &ct, &tag).is_err());
    }

    #[test]
    fn test_empty_plaintext() {
        let nonce = Nonce::generate();
        let (ct, tag) = encrypt(&key(), &nonce, b"").unwrap();
        assert!(ct.is_empty());
        assert!(decrypt(&key(), &nonce, &ct, &tag).unwrap().is_empty());
    }

    #[test]
    fn test_slice_lengths_checked() {
        assert!(Nonce::from_slice(&[0; 11]).is_err());
        assert!(Tag::from_slice(&[0; 17]).is_err());
        assert!(Tag::from_slice(&[0; 16]).is_ok());
    }
}

//! Encrypted fragment envelope.
//!
//! An envelope carries everything the recipient needs to recover one
//! fragment: the AEAD ciphertext and tag, its nonce, and the KEM
//! encapsulation of the key. It serializes to a JSON object whose four
//! fields are standard base64.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::aead::{self, Nonce, Tag};
use crate::error::{CodecError, Result};
use crate::kem::{KemCiphertext, KemPublicKey, KemSecretKey};

/// An encrypted fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentEnvelope {
    /// AEAD ciphertext, same length as the plaintext.
    pub ciphertext: Vec<u8>,
    /// Nonce used for this encryption.
    pub nonce: Nonce,
    /// Detached authentication tag.
    pub tag: Tag,
    /// KEM encapsulation of the symmetric key.
    pub kem_ct: KemCiphertext,
}

/// Wire form: every field base64.
#[derive(Serialize, Deserialize)]
struct EnvelopeRepr {
    ciphertext: String,
    nonce: String,
    tag: String,
    kem_ct: String,
}

impl FragmentEnvelope {
    /// Encrypt `plaintext` to `recipient` under a fresh key and nonce.
    pub fn seal(plaintext: &[u8], recipient: &KemPublicKey) -> Result<Self> {
        let (secret, kem_ct) = recipient.encapsulate()?;
        let nonce = Nonce::generate();
        let (ciphertext, tag) = aead::encrypt(&secret.symmetric_key(), &nonce, plaintext)?;

        Ok(Self {
            ciphertext,
            nonce,
            tag,
            kem_ct,
        })
    }

    /// Recover the plaintext with the recipient's secret key.
    pub fn open(&self, secret_key: &KemSecretKey) -> Result<Vec<u8>> {
        let secret = secret_key.decapsulate(&self.kem_ct)?;
        aead::decrypt(&secret.symmetric_key(), &self.nonce, &self.ciphertext, &self.tag)
    }

    /// Serialize to JSON bytes.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        let repr = EnvelopeRepr {
            ciphertext: STANDARD.encode(&self.ciphertext),
            nonce: STANDARD.encode(self.nonce.as_bytes()),
            tag: STANDARD.encode(self.tag.as_bytes()),
            kem_ct: STANDARD.encode(self.kem_ct.as_bytes()),
        };
        serde_json::to_vec(&repr).map_err(|e| CodecError::EnvelopeFormat(e.to_string()))
    }

    /// Parse from JSON bytes.
    ///
    /// Fails with [`CodecError::EnvelopeFormat`] if a field is missing, is not
    /// valid base64, or has the wrong length.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let repr: EnvelopeRepr =
            serde_json::from_slice(bytes).map_err(|e| CodecError::EnvelopeFormat(e.to_string()))?;

        Ok(Self {
            ciphertext: decode_field("ciphertext", &repr.ciphertext)?,
            nonce: Nonce::from_slice(&decode_field("nonce", &repr.nonce)?)?,
            tag: Tag::from_slice(&decode_field("tag", &repr.tag)?)?,
            kem_ct: KemCiphertext::from_slice(&decode_field("kem_ct", &repr.kem_ct)?)?,
        })
    }
}

fn decode_field(name: &str, value: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(value)
        .map_err(|e| CodecError::EnvelopeFormat(format!("{name}: {e}")))
}

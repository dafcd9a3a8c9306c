//! Fragment encode/decode pipeline.
//!
//! Encoding seals the fragment, serializes the envelope to JSON and
//! compresses the JSON. Decoding reverses it. The output of
//! [`encode_fragment`] is the body of a fragment record.

use tracing::trace;

use crate::compression;
use crate::envelope::FragmentEnvelope;
use crate::error::Result;
use crate::kem::{KemPublicKey, KemSecretKey};

/// Encode one plaintext fragment into a compressed envelope.
pub fn encode_fragment(fragment: &[u8], recipient: &KemPublicKey, level: i32) -> Result<Vec<u8>> {
    let json = FragmentEnvelope::seal(fragment, recipient)?.to_json()?;
    let body = compression::compress(&json, level);
    trace!(
        plaintext = fragment.len(),
        envelope = json.len(),
        encoded = body.len(),
        "encoded fragment"
    );
    Ok(body)
}

/// Decode a fragment record body back to the plaintext fragment.
pub fn decode_fragment(body: &[u8], secret_key: &KemSecretKey) -> Result<Vec<u8>> {
    let json = compression::decompress(body)?;
    FragmentEnvelope::from_json(&json)?.open(secret_key)
}

//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use credledger_codec::compression::{self, DEFAULT_LEVEL};
use credledger_codec::{encode_fragment, FragmentEnvelope, KemPublicKey, KemSecretKey};
use credledger_core::{fragment_payload, Keypair, Ledger, PublicKey};

const KEM_SEED_CONTEXT: &str = "credledger-testkit 2024 fixture kem seed";

/// A test fixture with a signing key and a KEM key.
pub struct TestFixture {
    pub keypair: Keypair,
    kem_seed: [u8; 32],
}

impl TestFixture {
    /// Create a new test fixture with random keys.
    pub fn new() -> Self {
        let kem = KemSecretKey::generate();
        Self {
            keypair: Keypair::generate(),
            kem_seed: kem.to_bytes(),
        }
    }

    /// Create with deterministic keys derived from `seed`.
    ///
    /// The KEM seed is a keyed hash of `seed`, so seeds that differ only in
    /// bits X25519 clamps away still give distinct KEM keys.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self {
            keypair: Keypair::from_seed(&seed),
            kem_seed: blake3::derive_key(KEM_SEED_CONTEXT, &seed),
        }
    }

    /// The signer's public key.
    pub fn public_key(&self) -> PublicKey {
        self.keypair.public_key()
    }

    /// A fresh handle to the KEM secret key.
    pub fn kem_secret(&self) -> KemSecretKey {
        KemSecretKey::from_bytes(self.kem_seed)
    }

    /// The KEM public key.
    pub fn kem_public_key(&self) -> KemPublicKey {
        self.kem_secret().public_key()
    }

    /// Encode `fragment` into a record body sealed to this fixture.
    pub fn fragment_body(&self, fragment: &[u8]) -> Vec<u8> {
        encode_fragment(fragment, &self.kem_public_key(), DEFAULT_LEVEL)
            .expect("fragment encoding failed")
    }

    /// Encode `fragment` with one ciphertext byte flipped.
    ///
    /// The body still decompresses and parses; only authentication fails.
    pub fn tampered_fragment_body(&self, fragment: &[u8]) -> Vec<u8> {
        let json =
            compression::decompress(&self.fragment_body(fragment)).expect("decompress failed");
        let mut envelope = FragmentEnvelope::from_json(&json).expect("envelope parse failed");
        match envelope.ciphertext.first_mut() {
            Some(byte) => *byte ^= 0x01,
            None => envelope.tag.0[0] ^= 0x01,
        }
        compression::compress(&envelope.to_json().expect("envelope json failed"), DEFAULT_LEVEL)
    }

    /// Append a signed fragment record carrying `body`.
    pub fn append_fragment(&self, ledger: &mut Ledger, body: &[u8]) -> u64 {
        ledger
            .append_payload(fragment_payload(body), &self.keypair)
            .expect("append failed")
            .index()
    }

    /// A ledger with `count` signed records carrying opaque payloads.
    pub fn signed_chain(&self, count: usize) -> Ledger {
        let mut ledger = Ledger::new();
        for i in 0..count {
            let payload = format!("record {i}").into_bytes();
            ledger
                .append_payload(fragment_payload(&payload), &self.keypair)
                .expect("append failed");
        }
        ledger
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixtures for several independent operators.
pub fn multi_party_fixtures(count: usize) -> Vec<TestFixture> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[0] = i as u8;
            seed[31] = 0x5a;
            TestFixture::with_seed(seed)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use credledger_codec::{decode_fragment, CodecError};

    #[test]
    fn test_fixture_chain_is_valid() {
        let fixture = TestFixture::new();
        let ledger = fixture.signed_chain(3);
        assert_eq!(ledger.len(), 4);
        assert!(ledger.is_chain_valid());
    }

    #[test]
    fn test_seeded_fixture_is_deterministic() {
        let a = TestFixture::with_seed([9; 32]);
        let b = TestFixture::with_seed([9; 32]);
        assert_eq!(a.public_key(), b.public_key());
        assert_eq!(a.kem_public_key(), b.kem_public_key());
    }

    #[test]
    fn test_tampered_body_fails_authentication() {
        let fixture = TestFixture::new();
        let body = fixture.tampered_fragment_body(b"some fragment");
        assert!(matches!(
            decode_fragment(&body, &fixture.kem_secret()),
            Err(CodecError::Decryption(_))
        ));
    }

    #[test]
    fn test_multi_party_keys_differ() {
        let parties = multi_party_fixtures(4);
        for (i, a) in parties.iter().enumerate() {
            for b in &parties[i + 1..] {
                assert_ne!(a.public_key(), b.public_key());
                assert_ne!(a.kem_public_key(), b.kem_public_key());
            }
        }
    }

    #[test]
    fn test_seeds_differing_in_clamped_bits_give_distinct_kem_keys() {
        let mut low = [0x5a; 32];
        low[0] = 0x01;
        let mut high = low;
        high[0] = 0x02;
        assert_ne!(
            TestFixture::with_seed(low).kem_public_key(),
            TestFixture::with_seed(high).kem_public_key()
        );
    }
}

//! Proptest generators for property-based testing.

use proptest::prelude::*;

use credledger_codec::KemSecretKey;
use credledger_core::{Keypair, Metadata};

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Generate a random KEM secret key.
pub fn kem_secret() -> impl Strategy<Value = KemSecretKey> {
    any::<[u8; 32]>().prop_map(KemSecretKey::from_bytes)
}

/// Generate file contents of at most `max_len` bytes.
///
/// Mixes random bytes with highly compressible runs so both the `CMP` and
/// `NOC` branches get exercised.
pub fn file_bytes(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        prop::collection::vec(any::<u8>(), 0..=max_len),
        (any::<u8>(), 0..=max_len).prop_map(|(b, n)| vec![b; n]),
    ]
}

/// Generate a valid fragment percentage.
pub fn fragment_percent() -> impl Strategy<Value = u8> {
    1u8..=100
}

/// Generate metadata with a few extra fields.
pub fn metadata() -> impl Strategy<Value = Metadata> {
    (
        "[A-Z][a-z]{1,12} [A-Z][a-z]{1,12}",
        "[A-Za-z ]{1,32}",
        "(19|20)[0-9]{2}-(0[1-9]|1[0-2])-(0[1-9]|[12][0-9])",
        prop::collection::btree_map("[a-z_]{1,10}", "[ -~]{0,20}", 0..3),
    )
        .prop_map(|(subject, credential, issued_on, extra)| {
            extra
                .into_iter()
                .filter(|(k, _)| !Metadata::is_reserved_field(k))
                .fold(Metadata::new(subject, credential, issued_on), |m, (k, v)| {
                    m.with_field(k, v)
                })
        })
}

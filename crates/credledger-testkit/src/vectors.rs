//! Golden test vectors for record digests.
//!
//! These pin the canonical digest encoding so a change to it is caught
//! immediately rather than surfacing as unreadable ledgers.

use credledger_core::{compute_digest, Digest};

/// A golden digest vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Record index.
    pub index: u64,
    /// Timestamp (Unix ms).
    pub timestamp: i64,
    /// Full payload, kind tag included.
    pub payload: &'static [u8],
    /// Previous digest (hex), `None` for the genesis sentinel.
    pub previous: Option<&'static str>,
    /// Expected digest (hex).
    pub expected_digest: &'static str,
}

const GENESIS_AT_ZERO: &str = "7e0bf79151e07c96aac5e6fb893e5a1571f4873d558c4e340c508bc78d86acb6";
const FRAGMENT_AFTER_GENESIS: &str =
    "8fa3b1e2a8557902022c81b92df1c47435404d84329ecf1f4c42fdafccb0a0d2";

/// Get all golden vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "genesis at timestamp 0",
            index: 0,
            timestamp: 0,
            payload: b"\x00Genesis Block",
            previous: None,
            expected_digest: GENESIS_AT_ZERO,
        },
        GoldenVector {
            name: "genesis at 2023-11-14",
            index: 0,
            timestamp: 1_700_000_000_000,
            payload: b"\x00Genesis Block",
            previous: None,
            expected_digest: "abbdf8f057cda6fe0cba2bc967164157e856cac606ef254da69b41786a27754c",
        },
        GoldenVector {
            name: "fragment linked to genesis",
            index: 1,
            timestamp: 1000,
            payload: b"\x02hello",
            previous: Some(GENESIS_AT_ZERO),
            expected_digest: FRAGMENT_AFTER_GENESIS,
        },
        GoldenVector {
            name: "empty payload",
            index: 2,
            timestamp: 1000,
            payload: b"",
            previous: Some(FRAGMENT_AFTER_GENESIS),
            expected_digest: "3dc239a40b81843f88ef93348ffc55a5e9909ebcd51940b761c18ed699540aee",
        },
    ]
}

/// Compute the digest described by a vector.
pub fn digest_for_vector(vector: &GoldenVector) -> Digest {
    let previous = vector.previous.map(|hex| {
        Digest::from_hex(hex).unwrap_or_else(|e| panic!("{}: bad previous hex: {e}", vector.name))
    });
    compute_digest(vector.index, vector.timestamp, vector.payload, previous.as_ref())
}

/// Check every vector, returning the names of those that fail.
pub fn verify_all_vectors() -> Vec<&'static str> {
    all_vectors()
        .iter()
        .filter(|v| digest_for_vector(v).to_hex() != v.expected_digest)
        .map(|v| v.name)
        .collect()
}

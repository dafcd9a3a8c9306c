//! Record: one immutable link of the ledger.
//!
//! A record binds `index ‖ timestamp ‖ payload ‖ previous_digest` under a
//! SHA-256 digest, and optionally a signature over that digest. All fields
//! are fixed at construction; there are no setters.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::crypto::{Keypair, PublicKey, Signature};
use crate::error::{LedgerError, Result};
use crate::payload::{RecordBody, RecordKind};
use crate::types::Digest;

/// Domain separator for record digests.
pub const DIGEST_DOMAIN: &[u8] = b"credledger/record-digest/v1";

/// Persisted form of the genesis sentinel previous digest.
pub const GENESIS_LINK: &str = "0";

/// Canonical bytes hashed into a record digest.
///
/// Fixed-width integers and a length-prefixed payload keep the encoding
/// unambiguous.
pub fn canonical_digest_bytes(
    index: u64,
    timestamp: i64,
    payload: &[u8],
    previous: Option<&Digest>,
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(DIGEST_DOMAIN.len() + 8 + 8 + 8 + payload.len() + 33);
    buf.extend_from_slice(DIGEST_DOMAIN);
    buf.extend_from_slice(&index.to_be_bytes());
    buf.extend_from_slice(&timestamp.to_be_bytes());
    buf.extend_from_slice(&(payload.len() as u64).to_be_bytes());
    buf.extend_from_slice(payload);
    match previous {
        None => buf.push(0x00),
        Some(prev) => {
            buf.push(0x01);
            buf.extend_from_slice(prev.as_bytes());
        }
    }
    buf
}

/// Compute the digest of a record's four bound fields.
pub fn compute_digest(
    index: u64,
    timestamp: i64,
    payload: &[u8],
    previous: Option<&Digest>,
) -> Digest {
    Digest::hash(&canonical_digest_bytes(index, timestamp, payload, previous))
}

/// Current time in Unix milliseconds.
pub fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// A committed or candidate ledger record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub(crate) index: u64,
    pub(crate) timestamp: i64,
    pub(crate) payload: Bytes,
    pub(crate) previous_digest: Option<Digest>,
    pub(crate) digest: Digest,
    pub(crate) signature: Option<Signature>,
    pub(crate) signer_public_key: Option<PublicKey>,
}

impl Record {
    /// Position in the ledger (0 is genesis).
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Creation time, Unix milliseconds.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// The raw payload bytes, including the kind tag.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Digest of the predecessor, `None` for the genesis sentinel.
    pub fn previous_digest(&self) -> Option<&Digest> {
        self.previous_digest.as_ref()
    }

    /// The stored digest. Never recomputed implicitly.
    pub fn digest(&self) -> &Digest {
        &self.digest
    }

    /// The signature over the digest, if any.
    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    /// The public key carried with the record, if any.
    pub fn signer_public_key(&self) -> Option<&PublicKey> {
        self.signer_public_key.as_ref()
    }

    /// Check if this record carries a signature.
    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }

    /// Recompute the digest from the record's fields.
    pub fn recompute_digest(&self) -> Digest {
        compute_digest(
            self.index,
            self.timestamp,
            &self.payload,
            self.previous_digest.as_ref(),
        )
    }

    /// Check whether the stored digest matches the record's fields.
    pub fn digest_matches(&self) -> bool {
        self.recompute_digest() == self.digest
    }

    /// Verify the signature over the stored digest with `public_key`.
    ///
    /// Returns `false` when no signature is present or it does not verify.
    pub fn verify(&self, public_key: &PublicKey) -> bool {
        match &self.signature {
            Some(signature) => public_key.verify_digest(&self.digest, signature),
            None => false,
        }
    }

    /// Verify the signature with the public key the record carries.
    pub fn verify_self(&self) -> bool {
        match &self.signer_public_key {
            Some(public_key) => self.verify(public_key),
            None => false,
        }
    }

    /// The payload kind, if the tag is recognized.
    pub fn kind(&self) -> Option<RecordKind> {
        self.payload.first().copied().and_then(RecordKind::from_u8)
    }

    /// Classify and parse the payload.
    pub fn body(&self) -> Result<RecordBody<'_>> {
        RecordBody::parse(self.index, &self.payload)
    }

    /// Convert to the persisted representation.
    pub fn to_repr(&self) -> RecordRepr {
        RecordRepr {
            index: self.index,
            timestamp: self.timestamp,
            data: hex::encode(&self.payload),
            previous_hash: self
                .previous_digest
                .map(|d| d.to_hex())
                .unwrap_or_else(|| GENESIS_LINK.to_string()),
            hash: self.digest.to_hex(),
            signature: self.signature.map(|s| s.to_hex()),
            public_key: self.signer_public_key.map(|k| k.to_hex()),
        }
    }

    /// Restore from the persisted representation.
    ///
    /// The digest and signature are taken verbatim; nothing is recomputed or
    /// re-signed, so tampering stays detectable by validation.
    pub fn from_repr(repr: RecordRepr) -> Result<Self> {
        let malformed = |field: &str, e: hex::FromHexError| {
            LedgerError::Malformed(format!("record {} {field}: {e}", repr.index))
        };

        let payload = hex::decode(&repr.data).map_err(|e| malformed("data", e))?;
        let previous_digest = if repr.previous_hash == GENESIS_LINK {
            None
        } else {
            Some(Digest::from_hex(&repr.previous_hash).map_err(|e| malformed("previous_hash", e))?)
        };
        let digest = Digest::from_hex(&repr.hash).map_err(|e| malformed("hash", e))?;
        let signature = repr
            .signature
            .as_deref()
            .map(Signature::from_hex)
            .transpose()
            .map_err(|e| malformed("signature", e))?;
        let signer_public_key = repr
            .public_key
            .as_deref()
            .map(PublicKey::from_hex)
            .transpose()
            .map_err(|e| malformed("public_key", e))?;

        Ok(Self {
            index: repr.index,
            timestamp: repr.timestamp,
            payload: Bytes::from(payload),
            previous_digest,
            digest,
            signature,
            signer_public_key,
        })
    }
}

/// Transport representation of a record.
///
/// Byte fields are hex encoded; `previous_hash` is `"0"` for genesis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordRepr {
    pub index: u64,
    pub timestamp: i64,
    pub data: String,
    pub previous_hash: String,
    pub hash: String,
    pub signature: Option<String>,
    pub public_key: Option<String>,
}

/// Builder for creating records.
pub struct RecordBuilder {
    index: u64,
    timestamp: Option<i64>,
    previous_digest: Option<Digest>,
    payload: Bytes,
}

impl RecordBuilder {
    /// Start building the record at `index`.
    pub fn new(index: u64) -> Self {
        Self {
            index,
            timestamp: None,
            previous_digest: None,
            payload: Bytes::new(),
        }
    }

    /// Set the timestamp. Defaults to the current time.
    pub fn timestamp(mut self, ts: i64) -> Self {
        self.timestamp = Some(ts);
        self
    }

    /// Set the predecessor's digest. Unset means the genesis sentinel.
    pub fn previous(mut self, digest: Digest) -> Self {
        self.previous_digest = Some(digest);
        self
    }

    /// Set the payload.
    pub fn payload(mut self, p: impl Into<Bytes>) -> Self {
        self.payload = p.into();
        self
    }

    /// Build an unsigned record.
    pub fn build(self) -> Record {
        let timestamp = self.timestamp.unwrap_or_else(now_millis);
        let digest = compute_digest(
            self.index,
            timestamp,
            &self.payload,
            self.previous_digest.as_ref(),
        );

        Record {
            index: self.index,
            timestamp,
            payload: self.payload,
            previous_digest: self.previous_digest,
            digest,
            signature: None,
            signer_public_key: None,
        }
    }

    /// Build the record and sign its digest.
    pub fn sign(self, keypair: &Keypair) -> Record {
        let mut record = self.build();
        record.signature = Some(keypair.sign_digest(&record.digest));
        record.signer_public_key = Some(keypair.public_key());
        record
    }
}

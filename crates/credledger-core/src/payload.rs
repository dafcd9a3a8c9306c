//! Record payload kinds.
//!
//! Every payload starts with a one-byte kind tag followed by the body. The
//! tag is part of the payload, so it is bound by the record digest and the
//! signature over it: a fragment can never be reinterpreted as metadata
//! without breaking the chain.

use std::collections::BTreeMap;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};

/// Body of the genesis record.
pub const GENESIS_MARKER: &[u8] = b"Genesis Block";

/// JSON keys taken by the required metadata fields.
pub const RESERVED_FIELDS: [&str; 3] = ["subject", "credential", "issued_on"];

/// The kind of record, determining how the payload body is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum RecordKind {
    /// First record of every ledger.
    Genesis = 0x00,
    /// Structured description of the stored file.
    Metadata = 0x01,
    /// One encoded slice of the stored file.
    Fragment = 0x02,
}

impl RecordKind {
    /// Convert to the tag byte.
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Try to parse from a tag byte.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(Self::Genesis),
            0x01 => Some(Self::Metadata),
            0x02 => Some(Self::Fragment),
            _ => None,
        }
    }

    /// Human readable name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Genesis => "genesis",
            Self::Metadata => "metadata",
            Self::Fragment => "fragment",
        }
    }
}

/// Descriptive fields stored ahead of the fragments of a file.
///
/// `subject`, `credential` and `issued_on` are required; any additional
/// string fields are kept in `extra`. Extra keys may not reuse a required
/// field's name, and [`Metadata::to_json`] refuses metadata that does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Who the document was issued to.
    pub subject: String,
    /// Title of the credential.
    pub credential: String,
    /// Issue date, free form (usually `YYYY-MM-DD`).
    pub issued_on: String,
    /// Additional fields.
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl Metadata {
    /// Create metadata with the required fields.
    pub fn new(
        subject: impl Into<String>,
        credential: impl Into<String>,
        issued_on: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            credential: credential.into(),
            issued_on: issued_on.into(),
            extra: BTreeMap::new(),
        }
    }

    /// Add an extra field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Whether `key` names a required field.
    pub fn is_reserved_field(key: &str) -> bool {
        RESERVED_FIELDS.contains(&key)
    }

    /// Serialize to JSON bytes.
    ///
    /// An extra field shadowing a required one would serialize the key twice
    /// and the result could never be parsed back, so it is rejected here.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        if let Some(key) = self.extra.keys().find(|k| Self::is_reserved_field(k)) {
            return Err(LedgerError::Malformed(format!(
                "metadata extra field {key:?} shadows a required field"
            )));
        }
        serde_json::to_vec(self).map_err(|e| LedgerError::Malformed(e.to_string()))
    }

    /// Parse from JSON bytes. Fails if a required field is missing.
    pub fn from_json(bytes: &[u8]) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

/// Build a payload from a kind tag and body.
pub fn encode_payload(kind: RecordKind, body: &[u8]) -> Bytes {
    let mut buf = Vec::with_capacity(1 + body.len());
    buf.push(kind.to_u8());
    buf.extend_from_slice(body);
    Bytes::from(buf)
}

/// The fixed genesis payload.
pub fn genesis_payload() -> Bytes {
    encode_payload(RecordKind::Genesis, GENESIS_MARKER)
}

/// A metadata payload.
pub fn metadata_payload(metadata: &Metadata) -> Result<Bytes> {
    Ok(encode_payload(RecordKind::Metadata, &metadata.to_json()?))
}

/// A fragment payload wrapping an already encoded fragment body.
pub fn fragment_payload(body: &[u8]) -> Bytes {
    encode_payload(RecordKind::Fragment, body)
}

/// A decoded payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordBody<'a> {
    Genesis,
    Metadata(Metadata),
    Fragment(&'a [u8]),
}

impl<'a> RecordBody<'a> {
    /// Classify and parse the payload of the record at `index`.
    pub fn parse(index: u64, payload: &'a [u8]) -> Result<Self> {
        let format_err = |reason: String| LedgerError::PayloadFormat { index, reason };

        let (&tag, body) = payload
            .split_first()
            .ok_or_else(|| format_err("empty payload".into()))?;
        let kind = RecordKind::from_u8(tag)
            .ok_or_else(|| format_err(format!("unknown kind tag 0x{tag:02x}")))?;

        match kind {
            RecordKind::Genesis if body == GENESIS_MARKER => Ok(Self::Genesis),
            RecordKind::Genesis => Err(format_err("unexpected genesis marker".into())),
            RecordKind::Metadata => Metadata::from_json(body)
                .map(Self::Metadata)
                .map_err(|e| format_err(format!("metadata: {e}"))),
            RecordKind::Fragment => Ok(Self::Fragment(body)),
        }
    }

    /// The kind of this body.
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::Genesis => RecordKind::Genesis,
            Self::Metadata(_) => RecordKind::Metadata,
            Self::Fragment(_) => RecordKind::Fragment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_kind_roundtrip() {
        for kind in [RecordKind::Genesis, RecordKind::Metadata, RecordKind::Fragment] {
            assert_eq!(RecordKind::from_u8(kind.to_u8()), Some(kind));
        }
        assert_eq!(RecordKind::from_u8(0x7f), None);
    }

    #[test]
    fn test_genesis_payload_parses() {
        let payload = genesis_payload();
        assert_eq!(RecordBody::parse(0, &payload).unwrap(), RecordBody::Genesis);
    }

    #[test]
    fn test_metadata_payload_roundtrip() {
        let metadata = Metadata::new("Ada Lovelace", "MSc Mathematics", "1843-09-01")
            .with_field("issuer", "University of London");
        let payload = metadata_payload(&metadata).unwrap();

        match RecordBody::parse(1, &payload).unwrap() {
            RecordBody::Metadata(parsed) => assert_eq!(parsed, metadata),
            other => panic!("expected metadata, got {other:?}"),
        }
    }

    #[test]
    fn test_metadata_missing_field_rejected() {
        let body = br#"{"subject":"Ada","credential":"MSc"}"#;
        let payload = encode_payload(RecordKind::Metadata, body);
        let err = RecordBody::parse(4, &payload).unwrap_err();
        assert!(matches!(err, LedgerError::PayloadFormat { index: 4, .. }));
    }

    #[test]
    fn test_extra_field_shadowing_required_field_rejected() {
        for key in RESERVED_FIELDS {
            let metadata = Metadata::new("Ada", "MSc", "2024-01-01").with_field(key, "Mallory");
            assert!(matches!(metadata.to_json(), Err(LedgerError::Malformed(_))));
            assert!(matches!(metadata_payload(&metadata), Err(LedgerError::Malformed(_))));
        }
        assert!(Metadata::new("Ada", "MSc", "2024-01-01")
            .with_field("subjects", "x")
            .to_json()
            .is_ok());
    }

    #[test]
    fn test_fragment_that_looks_like_metadata_stays_fragment() {
        let body = br#"{"subject":"a","credential":"b","issued_on":"c"}"#;
        let payload = fragment_payload(body);
        assert_eq!(
            RecordBody::parse(2, &payload).unwrap(),
            RecordBody::Fragment(&body[..])
        );
    }

    #[test]
    fn test_unknown_tag_and_empty_payload_rejected() {
        assert!(RecordBody::parse(1, &[0x09, 1, 2]).is_err());
        assert!(RecordBody::parse(1, &[]).is_err());
        assert!(RecordBody::parse(0, &encode_payload(RecordKind::Genesis, b"x")).is_err());
    }
}

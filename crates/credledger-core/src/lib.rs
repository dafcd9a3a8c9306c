//! # credledger core
//!
//! Pure primitives for credledger: records, the hash-linked ledger, and the
//! Ed25519 signatures that bind them.
//!
//! This crate contains no I/O. It is pure computation over the chain.
//!
//! ## Key Types
//!
//! - [`Record`] - One immutable link: index, timestamp, payload, digests, signature
//! - [`Ledger`] - Append-only sequence of records starting at a genesis record
//! - [`Digest`] - SHA-256 record digest
//! - [`RecordKind`] - Discriminator for payload interpretation
//!
//! ## Integrity model
//!
//! Each record's digest covers its index, timestamp, payload and the digest
//! of its predecessor. Signatures cover the digest. [`Ledger::validate`]
//! re-checks every link, digest and signature and reports the first broken
//! index.

pub mod crypto;
pub mod error;
pub mod ledger;
pub mod payload;
pub mod record;
pub mod types;

pub use crypto::{Keypair, PublicKey, Signature};
pub use error::{LedgerError, Result};
pub use ledger::Ledger;
pub use payload::{
    encode_payload, fragment_payload, genesis_payload, metadata_payload, Metadata, RecordBody,
    RecordKind, GENESIS_MARKER, RESERVED_FIELDS,
};
pub use record::{
    compute_digest, now_millis, Record, RecordBuilder, RecordRepr, DIGEST_DOMAIN, GENESIS_LINK,
};
pub use types::Digest;

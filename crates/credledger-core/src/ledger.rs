//! Ledger: an ordered, append-only sequence of records.
//!
//! The ledger exclusively owns its records. Appending is the only mutation
//! and every candidate is checked against the committed tail before it is
//! accepted.

use bytes::Bytes;
use tracing::{debug, warn};

use crate::crypto::Keypair;
use crate::error::{LedgerError, Result};
use crate::payload::{genesis_payload, RecordKind};
use crate::record::{now_millis, Record, RecordBuilder, RecordRepr};

/// An append-only chain of records starting at a genesis record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    records: Vec<Record>,
}

impl Ledger {
    /// Create a ledger holding only the genesis record.
    pub fn new() -> Self {
        Self::with_genesis_timestamp(now_millis())
    }

    /// Create a ledger whose genesis record carries the given timestamp.
    pub fn with_genesis_timestamp(timestamp: i64) -> Self {
        let genesis = RecordBuilder::new(0)
            .timestamp(timestamp)
            .payload(genesis_payload())
            .build();
        Self {
            records: vec![genesis],
        }
    }

    /// Number of records, genesis included.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// A ledger always holds its genesis record.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in index order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Get the record at `index`.
    pub fn get(&self, index: u64) -> Option<&Record> {
        usize::try_from(index).ok().and_then(|i| self.records.get(i))
    }

    /// The genesis record.
    pub fn genesis(&self) -> &Record {
        &self.records[0]
    }

    /// The most recently committed record.
    pub fn tail(&self) -> &Record {
        &self.records[self.records.len() - 1]
    }

    /// Index the next appended record must carry.
    pub fn next_index(&self) -> u64 {
        self.records.len() as u64
    }

    /// Append a record after checking it against the current tail.
    ///
    /// Checks, in order: the index is the next free position, the record
    /// links to the tail's digest, its digest matches its fields, its
    /// signature verifies under the key it carries, and its timestamp does
    /// not precede the tail's. On failure the ledger is left untouched.
    pub fn append(&mut self, record: Record) -> Result<&Record> {
        if let Err(e) = check_link(self.tail(), &record) {
            warn!(index = record.index(), error = %e, "rejected append");
            return Err(e);
        }

        debug!(
            index = record.index(),
            digest = %record.digest(),
            "record appended"
        );
        self.records.push(record);
        Ok(self.tail())
    }

    /// Build the next record for `payload`, sign it and append it.
    pub fn append_payload(
        &mut self,
        payload: impl Into<Bytes>,
        keypair: &Keypair,
    ) -> Result<&Record> {
        let tail = self.tail();
        let timestamp = now_millis().max(tail.timestamp());
        let record = RecordBuilder::new(self.next_index())
            .timestamp(timestamp)
            .previous(*tail.digest())
            .payload(payload)
            .sign(keypair);
        self.append(record)
    }

    /// Validate the whole chain, returning the first failure.
    pub fn validate(&self) -> Result<()> {
        check_genesis(self.records.first().ok_or_else(|| {
            LedgerError::InvalidGenesis("ledger has no records".into())
        })?)?;

        for pair in self.records.windows(2) {
            check_link(&pair[0], &pair[1])?;
        }
        Ok(())
    }

    /// Check whether the whole chain is intact.
    pub fn is_chain_valid(&self) -> bool {
        match self.validate() {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "chain validation failed");
                false
            }
        }
    }

    /// Concatenate all raw payloads in index order.
    ///
    /// Diagnostic only; payloads still carry their kind tags.
    pub fn rebuild_payload_concat(&self) -> Vec<u8> {
        self.records
            .iter()
            .flat_map(|r| r.payload().iter().copied())
            .collect()
    }

    /// Convert to the persisted representation.
    pub fn to_reprs(&self) -> Vec<RecordRepr> {
        self.records.iter().map(Record::to_repr).collect()
    }

    /// Restore from the persisted representation without validating.
    pub fn from_reprs(reprs: Vec<RecordRepr>) -> Result<Self> {
        if reprs.is_empty() {
            return Err(LedgerError::Malformed("ledger has no records".into()));
        }
        let records = reprs
            .into_iter()
            .map(Record::from_repr)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { records })
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

fn check_genesis(genesis: &Record) -> Result<()> {
    if genesis.index() != 0 {
        return Err(LedgerError::InvalidGenesis(format!(
            "first record has index {}",
            genesis.index()
        )));
    }
    if genesis.previous_digest().is_some() {
        return Err(LedgerError::InvalidGenesis("previous digest is not the sentinel".into()));
    }
    if genesis.is_signed() {
        return Err(LedgerError::InvalidGenesis("genesis must not be signed".into()));
    }
    if genesis.kind() != Some(RecordKind::Genesis) {
        return Err(LedgerError::InvalidGenesis("payload is not the genesis marker".into()));
    }
    if !genesis.digest_matches() {
        return Err(LedgerError::DigestMismatch { index: 0 });
    }
    Ok(())
}

/// Check that `record` may follow `prev`.
fn check_link(prev: &Record, record: &Record) -> Result<()> {
    let expected = prev.index() + 1;
    let index = record.index();
    if index < expected {
        return Err(LedgerError::ImmutabilityViolation { index });
    }
    if index > expected {
        return Err(LedgerError::IndexOutOfSequence {
            expected,
            got: index,
        });
    }

    if record.previous_digest() != Some(prev.digest()) {
        return Err(LedgerError::InvalidRecordLink { index });
    }
    if !record.digest_matches() {
        return Err(LedgerError::DigestMismatch { index });
    }
    if !record.verify_self() {
        return Err(LedgerError::SignatureInvalid { index });
    }
    if record.timestamp() < prev.timestamp() {
        return Err(LedgerError::TimestampRegression { index });
    }
    Ok(())
}

//! Error types for the credledger core.

use thiserror::Error;

/// Errors raised while building, appending, validating or decoding records.
///
/// Every variant that concerns a committed or candidate record carries its
/// index so callers can report exactly where a chain broke.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("record {index} is already committed and cannot be replaced")]
    ImmutabilityViolation { index: u64 },

    #[error("record index out of sequence: expected {expected}, got {got}")]
    IndexOutOfSequence { expected: u64, got: u64 },

    #[error("record {index} does not link to its predecessor's digest")]
    InvalidRecordLink { index: u64 },

    #[error("record {index} digest does not match its contents")]
    DigestMismatch { index: u64 },

    #[error("record {index} signature is missing or invalid")]
    SignatureInvalid { index: u64 },

    #[error("record {index} timestamp is earlier than its predecessor's")]
    TimestampRegression { index: u64 },

    #[error("invalid genesis record: {0}")]
    InvalidGenesis(String),

    #[error("record {index} payload is malformed: {reason}")]
    PayloadFormat { index: u64, reason: String },

    #[error("malformed record data: {0}")]
    Malformed(String),
}

impl LedgerError {
    /// The index of the record the error refers to, if any.
    pub fn index(&self) -> Option<u64> {
        match self {
            LedgerError::ImmutabilityViolation { index }
            | LedgerError::InvalidRecordLink { index }
            | LedgerError::DigestMismatch { index }
            | LedgerError::SignatureInvalid { index }
            | LedgerError::TimestampRegression { index }
            | LedgerError::PayloadFormat { index, .. } => Some(*index),
            LedgerError::IndexOutOfSequence { got, .. } => Some(*got),
            LedgerError::InvalidGenesis(_) => Some(0),
            LedgerError::Malformed(_) => None,
        }
    }
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

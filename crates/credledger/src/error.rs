//! Error types for archive operations.

use credledger_codec::CodecError;
use credledger_core::LedgerError;
use credledger_store::StoreError;
use thiserror::Error;

/// Errors that can occur while archiving or extracting a file.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Append or ledger construction failed.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Codec error outside of per-record processing.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The ledger failed whole-chain validation before extraction.
    #[error("chain integrity check failed: {0}")]
    ChainIntegrity(#[source] LedgerError),

    /// A record was not signed by the expected key.
    #[error("record {index} is not signed by the expected key")]
    SignatureInvalid { index: u64 },

    /// A record's payload could not be decoded.
    #[error("failed to process record {index}: {source}")]
    RecordProcessing { index: u64, source: ProcessingError },

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Key material could not be loaded.
    #[error("key error: {0}")]
    Key(String),
}

impl ArchiveError {
    /// Index of the record the error refers to, if any.
    pub fn offending_index(&self) -> Option<u64> {
        match self {
            Self::Ledger(e) | Self::ChainIntegrity(e) => e.index(),
            Self::SignatureInvalid { index } | Self::RecordProcessing { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// Short machine-friendly name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Ledger(_) => "ledger",
            Self::Codec(_) => "codec",
            Self::Store(_) => "store",
            Self::Io(_) => "io",
            Self::ChainIntegrity(_) => "chain-integrity",
            Self::SignatureInvalid { .. } => "signature-invalid",
            Self::RecordProcessing { .. } => "record-processing",
            Self::Config(_) => "config",
            Self::Key(_) => "key",
        }
    }
}

/// Why a single record could not be decoded during extraction.
#[derive(Debug, Error)]
pub enum ProcessingError {
    /// Payload kind tag or metadata body is malformed.
    #[error(transparent)]
    Payload(#[from] LedgerError),

    /// Fragment body failed to decompress, parse or decrypt.
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Result type for archive operations.
pub type Result<T> = std::result::Result<T, ArchiveError>;

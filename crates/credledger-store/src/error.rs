//! Error types for the store module.

use credledger_core::LedgerError;
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Ledger file is not valid JSON or has the wrong shape.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Records could not be restored from their persisted form.
    #[error("invalid ledger data: {0}")]
    Ledger(#[from] LedgerError),

    /// No ledger with this name.
    #[error("ledger not found: {0}")]
    NotFound(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

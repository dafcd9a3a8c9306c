//! # credledger store
//!
//! Persistence for ledgers: the [`LedgerStore`] trait with a JSON file
//! backend and an in-memory backend for tests.
//!
//! Loading never validates. A tampered ledger loads fine and fails
//! `Ledger::validate` afterwards, which is how tampering is reported.

pub mod error;
pub mod file;
pub mod memory;
pub mod traits;

pub use error::{Result, StoreError};
pub use file::{read_ledger, write_ledger, FileStore};
pub use memory::MemoryStore;
pub use traits::{ledger_name, LedgerStore};

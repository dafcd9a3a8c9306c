//! # credledger
//!
//! A tamper-evident, append-only ledger that stores a file as a chain of
//! signed, encrypted and compressed records.
//!
//! ## Quick Start
//!
//! ```no_run
//! use credledger::{ArchiveConfig, Metadata, Session};
//!
//! let session = Session::generate(ArchiveConfig::default());
//! let mut ledger = session.create_ledger();
//!
//! let meta = Metadata::new("Ada Lovelace", "BSc Mathematics", "1843-07-01");
//! session.add_file(&mut ledger, b"file bytes", Some(&meta))?;
//!
//! assert!(session.verify_ledger(&ledger));
//! assert_eq!(session.extract_file(&ledger)?, b"file bytes");
//! # Ok::<(), credledger::ArchiveError>(())
//! ```
//!
//! ## Crate Structure
//!
//! - `credledger-core` - records, the hash-linked ledger and Ed25519 signing
//! - `credledger-codec` - fragmentation, compression and KEM envelope encryption
//! - `credledger-store` - JSON persistence
//! - `credledger` (this crate) - orchestration, sessions, config and the CLI

pub mod archive;
pub mod config;
pub mod error;
pub mod session;

pub use archive::{add_file, add_metadata, extract_file, list_metadata, verify_ledger, AddReport};
pub use config::{ArchiveConfig, CliConfig};
pub use error::{ArchiveError, ProcessingError, Result};
pub use session::Session;

// Re-export commonly used types from sub-crates
pub use credledger_codec::{CodecError, KemPublicKey, KemSecretKey};
pub use credledger_core::{
    Digest, Keypair, Ledger, LedgerError, Metadata, PublicKey, Record, RecordKind,
};
pub use credledger_store::{FileStore, LedgerStore, MemoryStore, StoreError};

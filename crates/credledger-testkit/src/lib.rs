//! # credledger testkit
//!
//! Testing utilities for credledger.
//!
//! - **Golden vectors**: fixed record digests that pin the canonical encoding
//! - **Generators**: proptest strategies for keys, files and metadata
//! - **Fixtures**: signing and KEM keys, and helpers for building valid or
//!   deliberately damaged ledgers
//!
//! ```rust
//! use credledger_testkit::fixtures::TestFixture;
//!
//! let fixture = TestFixture::new();
//! let ledger = fixture.signed_chain(3);
//! assert!(ledger.is_chain_valid());
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{multi_party_fixtures, TestFixture};
pub use vectors::{all_vectors, digest_for_vector, verify_all_vectors, GoldenVector};

//! # credledger codec
//!
//! Turns file bytes into fragment record bodies and back.
//!
//! ## Pipeline
//!
//! ```text
//! file ─split─▶ fragment ─seal─▶ envelope ─json─▶ text ─compress─▶ record body
//! ```
//!
//! - [`fragment`] - percentage-based splitting
//! - [`compression`] - zstd with a stored fallback, tagged `CMP` or `NOC`
//! - [`kem`] - X25519 key encapsulation to the recipient's public key
//! - [`aead`] - AES-128-GCM with a detached tag
//! - [`envelope`] - the JSON envelope holding ciphertext, nonce, tag and encapsulation
//!
//! Every fragment is sealed under its own encapsulated key and random nonce.

pub mod aead;
pub mod compression;
pub mod envelope;
pub mod error;
pub mod fragment;
pub mod kem;
pub mod pipeline;

pub use envelope::FragmentEnvelope;
pub use error::{CodecError, Result};
pub use fragment::{split, DEFAULT_FRAGMENT_PERCENT};
pub use kem::{KemCiphertext, KemPublicKey, KemSecretKey, SharedSecret};
pub use pipeline::{decode_fragment, encode_fragment};

//! Error types for the fragment codec.

use thiserror::Error;

/// Errors that can occur while encoding or decoding fragments.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Envelope is missing a field or a field cannot be decoded.
    #[error("envelope format error: {0}")]
    EnvelopeFormat(String),

    /// Authentication failed or the key could not be recovered.
    #[error("decryption failed: {0}")]
    Decryption(String),

    /// Encryption error.
    #[error("encryption error: {0}")]
    Encryption(String),

    /// Compressed buffer has an unknown tag or a corrupt body.
    #[error("compression format error: {0}")]
    CompressionFormat(String),

    /// Fragment percentage outside `1..=100`.
    #[error("invalid fragment percentage: {0} (expected 1..=100)")]
    InvalidFragmentPercent(u8),
}

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;

//! Paste encryption error types.

use thiserror::Error;

/// Result type for crypto engine operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur while encoding or decoding a paste envelope.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error("decryption failed: {0}")]
    Decryption(String),

    #[error("invalid paste secret: {0}")]
    InvalidSecret(String),

    #[error("malformed paste envelope: {0}")]
    MalformedEnvelope(String),

    #[error("paste format version {0} is not supported")]
    UnsupportedVersion(u32),

    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("compression error: {0}")]
    Compression(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

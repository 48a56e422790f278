//! Paste client error types.

use privatebin_crypto::{CryptoError, InvalidOption};
use thiserror::Error;

/// Result type for paste operations.
pub type PasteResult<T> = Result<T, PasteError>;

/// Errors that can occur while uploading, downloading or deleting a paste.
#[derive(Debug, Error)]
pub enum PasteError {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("malformed paste URL: {0}")]
    MalformedReference(String),

    #[error("formatting {value:?} must be one of {}", .allowed.join(", "))]
    BadFormat {
        value: String,
        allowed: &'static [&'static str],
    },

    #[error("expiration {value:?} must be one of {}", .allowed.join(", "))]
    BadExpirationTime {
        value: String,
        allowed: &'static [&'static str],
    },

    #[error("compression {value:?} must be one of {}", .allowed.join(", "))]
    BadCompressionType {
        value: String,
        allowed: &'static [&'static str],
    },

    #[error("unable to parse response from {url}: {detail}")]
    BadServerResponse { url: String, detail: String },

    #[error("PrivateBin host reported an error: {0}")]
    Protocol(String),

    #[error("unsupported feature: {0}")]
    UnsupportedFeature(String),

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("crypto worker failed: {0}")]
    Worker(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// The closed set of failure classes every `PasteError` belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Caller arguments were rejected before any network call.
    Validation,
    BadFormat,
    BadExpirationTime,
    BadCompressionType,
    /// The host is unreachable as a paste server or answered with garbage.
    BadServerResponse,
    /// The host refused the request, or the paste could not be decrypted.
    Protocol,
    /// The host is a paste server but lacks the requested capability, or
    /// the paste uses a format version the client's engine cannot handle.
    ///
    /// The second case is a client-side limitation: the built-in
    /// `PrivateBinCipher` only speaks format version 2, so uploading to a
    /// protocol 1 host and downloading a version 1 paste both land here.
    UnsupportedFeature,
    /// Network or worker-pool failure underneath the protocol.
    Transport,
}

impl PasteError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::MalformedReference(_) | Self::Io(_) | Self::Config(_) => {
                ErrorKind::Validation
            }
            Self::BadFormat { .. } => ErrorKind::BadFormat,
            Self::BadExpirationTime { .. } => ErrorKind::BadExpirationTime,
            Self::BadCompressionType { .. } => ErrorKind::BadCompressionType,
            Self::BadServerResponse { .. } => ErrorKind::BadServerResponse,
            Self::Protocol(_) => ErrorKind::Protocol,
            Self::UnsupportedFeature(_) => ErrorKind::UnsupportedFeature,
            Self::Crypto(CryptoError::UnsupportedVersion(_)) => ErrorKind::UnsupportedFeature,
            Self::Crypto(_) => ErrorKind::Protocol,
            Self::Http(_) | Self::Serialization(_) | Self::Worker(_) => ErrorKind::Transport,
        }
    }

    /// Maps an out-of-set option onto its typed error.
    pub(crate) fn from_invalid_option(err: InvalidOption) -> Self {
        let InvalidOption {
            option,
            value,
            allowed,
        } = err;
        match option {
            "formatting" => Self::BadFormat { value, allowed },
            "expiration" => Self::BadExpirationTime { value, allowed },
            "compression" => Self::BadCompressionType { value, allowed },
            other => Self::Validation(format!("{other} {value:?} is not allowed")),
        }
    }
}

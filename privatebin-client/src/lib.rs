//! Client for PrivateBin paste hosts.
//!
//! Uploads, downloads and deletes end-to-end encrypted pastes:
//! - Share URL codec (`{server}?{paste_id}#{secret}`)
//! - Response validation and a typed error taxonomy
//! - One protocol implementation driven by two clients: async
//!   (`PasteClient`, crypto on a bounded worker pool) and blocking
//!   (`blocking::PasteClient`, everything on the calling thread)
//!
//! Encryption itself lives in `privatebin-crypto`; any `CryptoEngine` can be
//! plugged in.

pub mod blocking;
pub mod client;
pub mod config;
pub mod error;
pub mod reference;
pub mod response;
pub mod transport;
pub mod types;
pub mod worker;

pub use client::{delete, get, send, PasteClient};
pub use config::ClientConfig;
pub use error::{ErrorKind, PasteError, PasteResult};
pub use reference::{build_share_url, extract_secret, parse_share_url, PasteReference};
pub use response::{verify, RawResponse, ServerStatus};
pub use types::*;
pub use worker::WorkerPool;

pub use privatebin_crypto::{
    Attachment, Compression, CryptoEngine, Expiration, Formatter, PrivateBinCipher,
};

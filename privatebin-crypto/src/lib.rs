//! Paste encryption for PrivateBin hosts.
//!
//! Provides the crypto engine the paste client is built on:
//! - `CryptoEngine`, the encode/decode contract the transport depends on
//! - `PrivateBinCipher`, the built-in engine for the v2 paste format
//! - Enumerated paste options (expiration, formatting, compression)
//!
//! # Format
//!
//! 1. **Secret**: 32 random bytes, base58-encoded into the share URL
//!    fragment. Hosts never see it.
//!
//! 2. **Cipher key**: PBKDF2-HMAC-SHA256 over the secret bytes followed by
//!    the optional password, salted per paste.
//!
//! 3. **Envelope**: AES-256-GCM ciphertext of the (optionally deflated) JSON
//!    plaintext, with the cipher parameters and paste flags in `adata`
//!    authenticated alongside it.

mod cipher;
pub mod engine;
pub mod envelope;
mod error;
mod key;
pub mod options;

pub use cipher::{PrivateBinCipher, FORMAT_VERSION, IV_SIZE, MAX_PASTE_SIZE};
pub use engine::CryptoEngine;
pub use envelope::{Attachment, EncodeRequest, EncodedPaste, PasteContent, PasteEnvelope};
pub use error::{CryptoError, CryptoResult};
pub use key::{DerivedKey, PasteKey, DEFAULT_ITERATIONS, KEY_SIZE, MAX_ITERATIONS, SALT_SIZE};
pub use options::{Compression, Expiration, Formatter, InvalidOption};

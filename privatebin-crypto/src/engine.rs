//! Pluggable paste encryption.
//!
//! The transport layer only ever talks to a `CryptoEngine`. Both calls are
//! pure: everything needed travels in the arguments and nothing is retained
//! between calls, so one engine can serve any number of threads.

use crate::envelope::{EncodeRequest, EncodedPaste, PasteContent, PasteEnvelope};
use crate::error::CryptoResult;

/// Seals plaintext into a host-ready envelope and opens it again.
pub trait CryptoEngine: Send + Sync + 'static {
    /// Encrypts a new paste under a freshly generated secret.
    fn encode(&self, request: &EncodeRequest) -> CryptoResult<EncodedPaste>;

    /// Decrypts an envelope with the secret from its share URL and, if the
    /// paste was protected, its password.
    fn decode(
        &self,
        envelope: &PasteEnvelope,
        secret: &str,
        password: Option<&str>,
    ) -> CryptoResult<PasteContent>;
}

impl<E: CryptoEngine + ?Sized> CryptoEngine for std::sync::Arc<E> {
    fn encode(&self, request: &EncodeRequest) -> CryptoResult<EncodedPaste> {
        (**self).encode(request)
    }

    fn decode(
        &self,
        envelope: &PasteEnvelope,
        secret: &str,
        password: Option<&str>,
    ) -> CryptoResult<PasteContent> {
        (**self).decode(envelope, secret, password)
    }
}

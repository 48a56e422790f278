//! Paste keys and password-based key derivation.

use crate::error::{CryptoError, CryptoResult};
use rand::RngCore;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Size of a paste key and of the derived AES-256 key, in bytes.
pub const KEY_SIZE: usize = 32;

/// Size of the PBKDF2 salt, in bytes.
pub const SALT_SIZE: usize = 8;

/// PBKDF2 iteration count used for new pastes.
pub const DEFAULT_ITERATIONS: u32 = 100_000;

/// Highest PBKDF2 iteration count accepted, from a host or a caller.
pub const MAX_ITERATIONS: u32 = 10_000_000;

/// The random per-paste key. Its base58 form is the share URL secret.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PasteKey([u8; KEY_SIZE]);

impl PasteKey {
    /// Generates a fresh key. Keys are never reused across pastes.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_SIZE];
        rand::rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Decodes a base58 secret.
    ///
    /// Secrets that decode short are left-padded with zeros, matching hosts
    /// whose web client dropped leading zero bytes.
    pub fn from_secret(secret: &str) -> CryptoResult<Self> {
        let decoded = Zeroizing::new(
            bs58::decode(secret)
                .into_vec()
                .map_err(|e| CryptoError::InvalidSecret(e.to_string()))?,
        );
        if decoded.is_empty() || decoded.len() > KEY_SIZE {
            return Err(CryptoError::InvalidSecret(format!(
                "expected up to {KEY_SIZE} bytes, got {}",
                decoded.len()
            )));
        }

        let mut bytes = [0u8; KEY_SIZE];
        bytes[KEY_SIZE - decoded.len()..].copy_from_slice(&decoded);
        Ok(Self(bytes))
    }

    pub fn to_secret(&self) -> String {
        bs58::encode(&self.0).into_string()
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    /// Derives the cipher key with PBKDF2-HMAC-SHA256 over key ‖ password.
    pub fn derive(
        &self,
        password: Option<&str>,
        salt: &[u8],
        iterations: u32,
    ) -> CryptoResult<DerivedKey> {
        if iterations == 0 || iterations > MAX_ITERATIONS {
            return Err(CryptoError::KeyDerivation(format!(
                "iteration count must be between 1 and {MAX_ITERATIONS}, got {iterations}"
            )));
        }

        let mut input = Zeroizing::new(self.0.to_vec());
        if let Some(password) = password {
            input.extend_from_slice(password.as_bytes());
        }

        let mut derived = [0u8; KEY_SIZE];
        pbkdf2::pbkdf2_hmac::<Sha256>(&input, salt, iterations, &mut derived);
        Ok(DerivedKey(derived))
    }
}

/// AES-256 key derived from a paste key.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey([u8; KEY_SIZE]);

impl DerivedKey {
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

/// Fills a fresh random buffer, used for salts and IVs.
pub(crate) fn random_bytes<const N: usize>() -> [u8; N] {
    let mut bytes = [0u8; N];
    rand::rng().fill_bytes(&mut bytes);
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_roundtrip() {
        let key = PasteKey::generate();
        let restored = PasteKey::from_secret(&key.to_secret()).unwrap();
        assert_eq!(key.as_bytes(), restored.as_bytes());
    }

    #[test]
    fn short_secret_is_left_padded() {
        let key = PasteKey::from_secret("2").unwrap();
        assert_eq!(key.as_bytes()[..KEY_SIZE - 1], [0u8; KEY_SIZE - 1]);
        assert_eq!(key.as_bytes()[KEY_SIZE - 1], 1);
    }

    #[test]
    fn non_base58_secret_is_rejected() {
        // '0' and 'l' are not in the base58 alphabet.
        assert!(matches!(
            PasteKey::from_secret("0l0l"),
            Err(CryptoError::InvalidSecret(_))
        ));
    }

    #[test]
    fn password_changes_derived_key() {
        let key = PasteKey::generate();
        let salt = random_bytes::<SALT_SIZE>();
        let plain = key.derive(None, &salt, 10).unwrap();
        let protected = key.derive(Some("hunter2"), &salt, 10).unwrap();
        assert_ne!(plain.as_bytes(), protected.as_bytes());
    }

    #[test]
    fn zero_iterations_rejected() {
        let key = PasteKey::generate();
        assert!(key.derive(None, b"saltsalt", 0).is_err());
    }

    #[test]
    fn iterations_above_ceiling_rejected() {
        let key = PasteKey::generate();
        assert!(key.derive(None, b"saltsalt", MAX_ITERATIONS + 1).is_err());
    }
}

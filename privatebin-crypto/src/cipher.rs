//! The PrivateBin v2 paste format.
//!
//! AES-256-GCM with a 16-byte IV and a 128-bit tag. The key comes from
//! PBKDF2-HMAC-SHA256 over the paste key and optional password. The
//! serialized `adata` array is bound in as associated data, so none of the
//! cipher parameters or paste flags can be altered without breaking the tag.

use crate::engine::CryptoEngine;
use crate::envelope::{Attachment, EncodeRequest, EncodedPaste, PasteContent, PasteEnvelope};
use crate::error::{CryptoError, CryptoResult};
use crate::key::{random_bytes, PasteKey, DEFAULT_ITERATIONS, MAX_ITERATIONS, SALT_SIZE};
use crate::options::Compression;
use aes_gcm::aead::consts::U16;
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::aes::Aes256;
use aes_gcm::AesGcm;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::io::{Read, Write};
use tracing::debug;
use zeroize::Zeroizing;

/// AES-256-GCM with the 16-byte nonce PrivateBin uses.
type PasteAead = AesGcm<Aes256, U16>;

/// Paste format version produced by this engine.
pub const FORMAT_VERSION: u32 = 2;

/// IV length in bytes.
pub const IV_SIZE: usize = 16;

/// Largest decrypted paste, after decompression, that decode will produce.
pub const MAX_PASTE_SIZE: usize = 64 * 1024 * 1024;

const KEY_BITS: u32 = 256;
const TAG_BITS: u32 = 128;

/// JSON plaintext sealed inside the envelope.
#[derive(Serialize, Deserialize)]
struct CipherMessage {
    paste: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    attachment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    attachment_name: Option<String>,
}

/// First element of `adata`:
/// `[iv, salt, iterations, key_bits, tag_bits, algorithm, mode, compression]`.
type CipherSpec = (String, String, u32, u32, u32, String, String, String);

struct CipherParams {
    iv: Vec<u8>,
    salt: Vec<u8>,
    iterations: u32,
    compression: Compression,
}

impl CipherParams {
    fn from_adata(adata: &Value) -> CryptoResult<Self> {
        let spec = adata
            .as_array()
            .and_then(|items| items.first())
            .ok_or_else(|| CryptoError::MalformedEnvelope("adata has no cipher spec".to_string()))?;
        let (iv, salt, iterations, key_bits, tag_bits, algorithm, mode, compression): CipherSpec =
            serde_json::from_value(spec.clone())
                .map_err(|e| CryptoError::MalformedEnvelope(format!("cipher spec: {e}")))?;

        if key_bits != KEY_BITS || tag_bits != TAG_BITS || algorithm != "aes" || mode != "gcm" {
            return Err(CryptoError::MalformedEnvelope(format!(
                "unsupported cipher {algorithm}-{key_bits}-{mode}/{tag_bits}"
            )));
        }

        if iterations == 0 || iterations > MAX_ITERATIONS {
            return Err(CryptoError::MalformedEnvelope(format!(
                "iteration count {iterations} is outside 1..={MAX_ITERATIONS}"
            )));
        }

        let iv = STANDARD
            .decode(iv)
            .map_err(|e| CryptoError::MalformedEnvelope(format!("iv: {e}")))?;
        if iv.len() != IV_SIZE {
            return Err(CryptoError::MalformedEnvelope(format!(
                "iv must be {IV_SIZE} bytes, got {}",
                iv.len()
            )));
        }
        let salt = STANDARD
            .decode(salt)
            .map_err(|e| CryptoError::MalformedEnvelope(format!("salt: {e}")))?;
        let compression = compression
            .parse::<Compression>()
            .map_err(|e| CryptoError::MalformedEnvelope(e.to_string()))?;

        Ok(Self {
            iv,
            salt,
            iterations,
            compression,
        })
    }
}

/// Built-in engine speaking the PrivateBin v2 format.
#[derive(Clone, Debug)]
pub struct PrivateBinCipher {
    iterations: u32,
}

impl Default for PrivateBinCipher {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

impl PrivateBinCipher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a custom PBKDF2 iteration count for new pastes. Decoding always
    /// honours the count recorded in the envelope.
    pub fn with_iterations(iterations: u32) -> Self {
        Self { iterations }
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }
}

impl CryptoEngine for PrivateBinCipher {
    fn encode(&self, request: &EncodeRequest) -> CryptoResult<EncodedPaste> {
        if request.protocol_version < FORMAT_VERSION {
            return Err(CryptoError::UnsupportedVersion(request.protocol_version));
        }

        let key = PasteKey::generate();
        let iv = random_bytes::<IV_SIZE>();
        let salt = random_bytes::<SALT_SIZE>();
        let derived = key.derive(request.password.as_deref(), &salt, self.iterations)?;

        let adata = json!([
            [
                STANDARD.encode(iv),
                STANDARD.encode(salt),
                self.iterations,
                KEY_BITS,
                TAG_BITS,
                "aes",
                "gcm",
                request.compression.as_str(),
            ],
            request.formatter.as_str(),
            u8::from(request.discussion),
            u8::from(request.burn_after_reading),
        ]);
        let aad = serde_json::to_vec(&adata)?;

        let message = CipherMessage {
            paste: request.text.clone(),
            attachment: request.attachment.as_ref().map(Attachment::to_data_url),
            attachment_name: request.attachment.as_ref().map(|a| a.name.clone()),
        };
        let serialized = Zeroizing::new(serde_json::to_vec(&message)?);
        let plaintext = Zeroizing::new(compress(request.compression, &serialized)?);

        let cipher = PasteAead::new(GenericArray::from_slice(derived.as_bytes()));
        let ciphertext = cipher
            .encrypt(
                GenericArray::from_slice(&iv),
                Payload {
                    msg: &plaintext,
                    aad: &aad,
                },
            )
            .map_err(|e| CryptoError::Encryption(format!("AES-GCM seal failed: {e}")))?;

        let mut envelope = PasteEnvelope::default();
        envelope.insert("v", json!(FORMAT_VERSION));
        envelope.insert("adata", adata);
        envelope.insert("ct", json!(STANDARD.encode(ciphertext)));
        envelope.insert("meta", json!({ "expire": request.expiration.as_str() }));

        Ok(EncodedPaste {
            envelope,
            secret: key.to_secret(),
        })
    }

    fn decode(
        &self,
        envelope: &PasteEnvelope,
        secret: &str,
        password: Option<&str>,
    ) -> CryptoResult<PasteContent> {
        let version = envelope.version();
        if version != FORMAT_VERSION {
            return Err(CryptoError::UnsupportedVersion(version));
        }

        let adata = envelope
            .get("adata")
            .ok_or_else(|| CryptoError::MalformedEnvelope("missing adata".to_string()))?;
        let params = CipherParams::from_adata(adata)?;
        let ciphertext = envelope
            .get("ct")
            .and_then(Value::as_str)
            .ok_or_else(|| CryptoError::MalformedEnvelope("missing ct".to_string()))?;
        let ciphertext = STANDARD
            .decode(ciphertext)
            .map_err(|e| CryptoError::MalformedEnvelope(format!("ct: {e}")))?;

        debug!(
            iterations = params.iterations,
            compression = %params.compression,
            "opening paste envelope"
        );

        let key = PasteKey::from_secret(secret)?;
        let derived = key.derive(password, &params.salt, params.iterations)?;
        let aad = serde_json::to_vec(adata)?;

        let cipher = PasteAead::new(GenericArray::from_slice(derived.as_bytes()));
        let plaintext = Zeroizing::new(
            cipher
                .decrypt(
                    GenericArray::from_slice(&params.iv),
                    Payload {
                        msg: &ciphertext,
                        aad: &aad,
                    },
                )
                .map_err(|_| {
                    CryptoError::Decryption(
                        "wrong secret or password, or tampered envelope".to_string(),
                    )
                })?,
        );
        let serialized = Zeroizing::new(decompress(params.compression, &plaintext)?);
        let message: CipherMessage = serde_json::from_slice(&serialized)?;

        let attachment = match message.attachment {
            Some(data_url) => Some(Attachment::from_data_url(
                message.attachment_name.unwrap_or_default(),
                &data_url,
            )?),
            None => None,
        };

        Ok(PasteContent {
            text: message.paste,
            attachment,
        })
    }
}

/// Raw deflate, no zlib header, as the PrivateBin web client produces.
fn compress(compression: Compression, data: &[u8]) -> CryptoResult<Vec<u8>> {
    match compression {
        Compression::None => Ok(data.to_vec()),
        Compression::Zlib => {
            let mut encoder = DeflateEncoder::new(Vec::new(), flate2::Compression::default());
            encoder.write_all(data)?;
            Ok(encoder.finish()?)
        }
    }
}

fn decompress(compression: Compression, data: &[u8]) -> CryptoResult<Vec<u8>> {
    inflate_limited(compression, data, MAX_PASTE_SIZE)
}

fn inflate_limited(compression: Compression, data: &[u8], limit: usize) -> CryptoResult<Vec<u8>> {
    let out = match compression {
        Compression::None => data.to_vec(),
        Compression::Zlib => {
            let mut out = Vec::new();
            DeflateDecoder::new(data)
                .take(limit as u64 + 1)
                .read_to_end(&mut out)?;
            out
        }
    };
    if out.len() > limit {
        return Err(CryptoError::MalformedEnvelope(format!(
            "decompressed paste exceeds {limit} bytes"
        )));
    }
    Ok(out)
}

//! Paste envelopes and the plaintext they carry.
//!
//! A `PasteEnvelope` is the JSON object a PrivateBin host stores. Apart from
//! the `v` field it is opaque to everything but the engine that produced it.

use crate::error::{CryptoError, CryptoResult};
use crate::options::{Compression, Expiration, Formatter};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Server-stored paste envelope.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasteEnvelope(Map<String, Value>);

impl PasteEnvelope {
    /// Wraps a JSON value, which must be an object.
    pub fn from_value(value: Value) -> CryptoResult<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(CryptoError::MalformedEnvelope(format!(
                "expected a JSON object, got {other}"
            ))),
        }
    }

    /// Paste format version. Envelopes without a `v` field predate it and
    /// are version 1.
    pub fn version(&self) -> u32 {
        self.0
            .get("v")
            .and_then(Value::as_u64)
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(1)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(field.into(), value)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

/// A file attached to a paste.
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    pub name: String,
    pub mime_type: String,
    pub content: Vec<u8>,
}

impl Attachment {
    pub const DEFAULT_MIME_TYPE: &'static str = "application/octet-stream";

    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            mime_type: Self::DEFAULT_MIME_TYPE.to_string(),
            content: content.into(),
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    /// Encodes the content as a `data:` URL, the form hosts store.
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type,
            STANDARD.encode(&self.content)
        )
    }

    /// Parses a base64 `data:` URL back into an attachment.
    pub fn from_data_url(name: impl Into<String>, data_url: &str) -> CryptoResult<Self> {
        let rest = data_url.strip_prefix("data:").ok_or_else(|| {
            CryptoError::MalformedEnvelope("attachment is not a data URL".to_string())
        })?;
        let (header, payload) = rest.split_once(',').ok_or_else(|| {
            CryptoError::MalformedEnvelope("attachment data URL has no payload".to_string())
        })?;
        let mime_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| {
                CryptoError::MalformedEnvelope("attachment data URL is not base64".to_string())
            })?;
        let content = STANDARD
            .decode(payload)
            .map_err(|e| CryptoError::MalformedEnvelope(format!("attachment payload: {e}")))?;

        Ok(Self {
            name: name.into(),
            mime_type: if mime_type.is_empty() {
                Self::DEFAULT_MIME_TYPE.to_string()
            } else {
                mime_type.to_string()
            },
            content,
        })
    }
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.content.len())
            .finish()
    }
}

/// Decrypted paste contents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PasteContent {
    pub text: String,
    pub attachment: Option<Attachment>,
}

/// Everything an engine needs to seal a new paste.
#[derive(Clone)]
pub struct EncodeRequest {
    pub text: String,
    pub attachment: Option<Attachment>,
    pub password: Option<String>,
    pub formatter: Formatter,
    pub burn_after_reading: bool,
    pub discussion: bool,
    pub expiration: Expiration,
    /// Already negotiated against `protocol_version`.
    pub compression: Compression,
    pub protocol_version: u32,
}

impl fmt::Debug for EncodeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodeRequest")
            .field("text_len", &self.text.len())
            .field("attachment", &self.attachment)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("formatter", &self.formatter)
            .field("burn_after_reading", &self.burn_after_reading)
            .field("discussion", &self.discussion)
            .field("expiration", &self.expiration)
            .field("compression", &self.compression)
            .field("protocol_version", &self.protocol_version)
            .finish()
    }
}

/// A sealed envelope plus the secret that opens it.
///
/// The secret belongs in the share URL fragment and is never sent to the host.
#[derive(Clone)]
pub struct EncodedPaste {
    pub envelope: PasteEnvelope,
    pub secret: String,
}

impl fmt::Debug for EncodedPaste {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodedPaste")
            .field("envelope", &self.envelope)
            .field("secret", &"<redacted>")
            .finish()
    }
}

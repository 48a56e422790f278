//! Request and result types for paste operations.

use crate::reference::PasteReference;
use privatebin_crypto::{Attachment, Compression, Expiration, Formatter};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;

/// Where an upload's attachment comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttachmentSource {
    /// Read from disk when the paste is encoded; named after the file.
    Path(PathBuf),
    Inline(Attachment),
}

/// Options for a new paste.
///
/// Enumerated options are kept as the raw strings the host expects so an
/// out-of-set value can be reported with the allowed set instead of being
/// unrepresentable. The typed setters take the `privatebin_crypto` enums.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadOptions {
    pub text: Option<String>,
    pub file: Option<AttachmentSource>,
    pub password: Option<String>,
    pub expiration: String,
    /// None disables compression, like `"none"`.
    pub compression: Option<String>,
    pub formatting: String,
    pub burn_after_reading: bool,
    pub discussion: bool,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            text: None,
            file: None,
            password: None,
            expiration: Expiration::default().to_string(),
            compression: Some(Compression::default().to_string()),
            formatting: Formatter::default().to_string(),
            burn_after_reading: false,
            discussion: false,
        }
    }
}

impl UploadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for a text-only paste.
    pub fn text(text: impl Into<String>) -> Self {
        Self::default().with_text(text)
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Attaches a file read from `path` at encode time.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(AttachmentSource::Path(path.into()));
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.file = Some(AttachmentSource::Inline(attachment));
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_expiration(mut self, expiration: impl ToString) -> Self {
        self.expiration = expiration.to_string();
        self
    }

    pub fn with_compression(mut self, compression: impl ToString) -> Self {
        self.compression = Some(compression.to_string());
        self
    }

    pub fn without_compression(mut self) -> Self {
        self.compression = None;
        self
    }

    pub fn with_formatting(mut self, formatting: impl ToString) -> Self {
        self.formatting = formatting.to_string();
        self
    }

    pub fn burn_after_reading(mut self, burn: bool) -> Self {
        self.burn_after_reading = burn;
        self
    }

    pub fn discussion(mut self, discussion: bool) -> Self {
        self.discussion = discussion;
        self
    }
}

impl fmt::Debug for UploadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadOptions")
            .field("text_len", &self.text.as_ref().map(String::len))
            .field("file", &self.file)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("expiration", &self.expiration)
            .field("compression", &self.compression)
            .field("formatting", &self.formatting)
            .field("burn_after_reading", &self.burn_after_reading)
            .field("discussion", &self.discussion)
            .finish()
    }
}

/// Credential returned at upload time; required to delete the paste.
///
/// The client never stores it. `Debug` does not reveal the value.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeletionToken(String);

impl DeletionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for DeletionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DeletionToken(<redacted>)")
    }
}

/// A paste the host accepted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadedPaste {
    pub reference: PasteReference,
    pub deletion_token: DeletionToken,
}

impl UploadedPaste {
    pub fn share_url(&self) -> String {
        self.reference.share_url()
    }
}

/// A downloaded and decrypted paste.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedPaste {
    pub id: Option<String>,
    pub url: Option<String>,
    pub text: String,
    pub attachment: Option<Attachment>,
    /// Host metadata (creation time, time to live, ...), passed through as-is.
    pub meta: Value,
    pub status: i64,
    /// Paste format version the envelope was stored with.
    pub version: u32,
}

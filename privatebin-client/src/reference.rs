//! Share URL codec.
//!
//! A share URL has the shape `{server}?{paste_id}#{secret}`. The secret sits
//! in the fragment, which HTTP clients never send, so the host only ever
//! sees the server and paste identifier.

use crate::error::{PasteError, PasteResult};
use std::fmt;
use std::str::FromStr;

const QUERY_MARKER: char = '?';
const FRAGMENT_MARKER: char = '#';

/// The three parts of a share URL.
#[derive(Clone, PartialEq, Eq)]
pub struct PasteReference {
    pub server: String,
    pub paste_id: String,
    pub secret: String,
}

impl PasteReference {
    /// Creates a reference, normalizing the server to end in a single `/`.
    pub fn new(
        server: impl AsRef<str>,
        paste_id: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            server: normalize_server(server.as_ref()),
            paste_id: paste_id.into(),
            secret: secret.into(),
        }
    }

    /// The URL the paste is fetched from: `{server}?{paste_id}`.
    pub fn paste_url(&self) -> String {
        format!("{}{QUERY_MARKER}{}", self.server, self.paste_id)
    }

    pub fn share_url(&self) -> String {
        build_share_url(&self.server, &self.paste_id, &self.secret)
    }
}

impl fmt::Display for PasteReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.share_url())
    }
}

impl fmt::Debug for PasteReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasteReference")
            .field("server", &self.server)
            .field("paste_id", &self.paste_id)
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl FromStr for PasteReference {
    type Err = PasteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_share_url(s)
    }
}

/// Trims trailing slashes and appends exactly one.
pub fn normalize_server(server: &str) -> String {
    format!("{}/", server.trim_end_matches('/'))
}

/// Builds `{server}/?{paste_id}#{secret}`.
pub fn build_share_url(server: &str, paste_id: &str, secret: &str) -> String {
    format!(
        "{}{QUERY_MARKER}{paste_id}{FRAGMENT_MARKER}{secret}",
        normalize_server(server)
    )
}

/// Splits a share URL into server, paste identifier and secret.
///
/// The first `?` ends the server, and the last `#` starts the secret.
pub fn parse_share_url(url: &str) -> PasteResult<PasteReference> {
    let query = url.find(QUERY_MARKER).ok_or_else(|| {
        PasteError::MalformedReference(format!("{url:?} has no paste identifier"))
    })?;
    let fragment = url.rfind(FRAGMENT_MARKER).ok_or_else(|| {
        PasteError::MalformedReference(format!("{url:?} has no secret"))
    })?;
    if fragment < query {
        return Err(PasteError::MalformedReference(format!(
            "{url:?} has its secret before its paste identifier"
        )));
    }

    Ok(PasteReference {
        server: url[..query].to_string(),
        paste_id: url[query + 1..fragment].to_string(),
        secret: url[fragment + 1..].to_string(),
    })
}

/// Returns only the secret: everything after the last `#`.
pub fn extract_secret(url: &str) -> PasteResult<&str> {
    url.rsplit_once(FRAGMENT_MARKER)
        .map(|(_, secret)| secret)
        .ok_or_else(|| PasteError::MalformedReference(format!("{url:?} has no secret")))
}

/// Returns the URL with its secret fragment removed.
pub fn strip_secret(url: &str) -> &str {
    url.rsplit_once(FRAGMENT_MARKER)
        .map_or(url, |(target, _)| target)
}

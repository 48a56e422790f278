//! Response validation.
//!
//! Both execution modes reduce an HTTP response to a `RawResponse` first, so
//! validation is written once.

use crate::error::{PasteError, PasteResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Mode-independent view of an HTTP response.
#[derive(Clone, Debug)]
pub struct RawResponse {
    /// Final URL after redirects.
    pub url: String,
    pub status: u16,
    pub body: Vec<u8>,
}

/// Decodes a response body as a JSON object.
///
/// Any body that is not a JSON object means the host is not a compatible
/// paste server (or sent nothing at all).
pub fn verify(response: &RawResponse) -> PasteResult<Value> {
    match serde_json::from_slice::<Value>(&response.body) {
        Ok(value @ Value::Object(_)) => Ok(value),
        Ok(_) => Err(bad_response(response, "expected a JSON object")),
        Err(e) => Err(bad_response(response, &e.to_string())),
    }
}

fn bad_response(response: &RawResponse, detail: &str) -> PasteError {
    PasteError::BadServerResponse {
        url: response.url.clone(),
        detail: format!("HTTP {}: {detail}", response.status),
    }
}

/// Status fields common to every PrivateBin JSON response.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerStatus {
    /// 0 on success.
    pub status: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletetoken: Option<String>,
}

impl ServerStatus {
    /// Reads the status fields out of a verified body.
    pub fn from_body(body: &Value, response_url: &str) -> PasteResult<Self> {
        Self::deserialize(body).map_err(|e| PasteError::BadServerResponse {
            url: response_url.to_string(),
            detail: format!("missing or invalid status: {e}"),
        })
    }

    pub fn is_success(&self) -> bool {
        self.status == 0
    }

    /// Turns a non-zero status into `PasteError::Protocol` with the host's message.
    pub fn into_result(self) -> PasteResult<Self> {
        if self.is_success() {
            return Ok(self);
        }
        let message = self
            .message
            .unwrap_or_else(|| "unknown error".to_string());
        warn!(status = self.status, %message, "PrivateBin host rejected request");
        Err(PasteError::Protocol(message))
    }
}

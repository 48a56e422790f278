//! Shared helpers for client tests against a wiremock PrivateBin host.

#![allow(dead_code)]

use privatebin_client::config::{DEFAULT_REQUESTED_WITH, REQUESTED_WITH_HEADER};
use privatebin_crypto::{
    CryptoEngine, CryptoError, CryptoResult, EncodeRequest, EncodedPaste, PasteContent,
    PasteEnvelope,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

/// Secret every `RecordingEngine` paste is sealed under.
pub const STUB_SECRET: &str = "stubsecret";

pub const PASTE_ID: &str = "abc123";
pub const DELETE_TOKEN: &str = "feedbeef";

/// Engine that seals pastes in plain JSON and remembers every encode call.
#[derive(Clone, Default)]
pub struct RecordingEngine {
    requests: Arc<Mutex<Vec<EncodeRequest>>>,
}

impl RecordingEngine {
    pub fn requests(&self) -> Vec<EncodeRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl CryptoEngine for RecordingEngine {
    fn encode(&self, request: &EncodeRequest) -> CryptoResult<EncodedPaste> {
        self.requests.lock().unwrap().push(request.clone());
        let envelope = PasteEnvelope::from_value(json!({
            "v": 2,
            "adata": [[], request.formatter.as_str(), 0, 0],
            "ct": request.text,
            "meta": { "expire": request.expiration.as_str() },
        }))?;
        Ok(EncodedPaste {
            envelope,
            secret: STUB_SECRET.to_string(),
        })
    }

    fn decode(
        &self,
        envelope: &PasteEnvelope,
        secret: &str,
        _password: Option<&str>,
    ) -> CryptoResult<PasteContent> {
        if secret != STUB_SECRET {
            return Err(CryptoError::Decryption("wrong secret".into()));
        }
        let text = envelope
            .get("ct")
            .and_then(Value::as_str)
            .ok_or_else(|| CryptoError::MalformedEnvelope("missing ct".into()))?;
        Ok(PasteContent {
            text: text.to_string(),
            attachment: None,
        })
    }
}

/// Matches requests whose raw query string is exactly the given text.
///
/// Paste fetches use a bare `?{id}` query that key/value matchers can't express.
pub struct QueryIs(pub &'static str);

impl Match for QueryIs {
    fn matches(&self, request: &Request) -> bool {
        request.url.query() == Some(self.0)
    }
}

/// Answers the version probe with a JSON-LD schema declaring `version`.
pub async fn mount_version(server: &MockServer, version: u32) {
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("jsonld", "paste"))
        .and(header(REQUESTED_WITH_HEADER, DEFAULT_REQUESTED_WITH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "@context": { "v": { "@id": "pb:Version", "@value": version } }
        })))
        .mount(server)
        .await;
}

/// Answers the version probe with a schema that predates the version field.
pub async fn mount_legacy_version(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("jsonld", "paste"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "@context": { "ct": "pb:CipherText" }
        })))
        .mount(server)
        .await;
}

pub fn upload_success() -> Value {
    json!({
        "status": 0,
        "id": PASTE_ID,
        "url": format!("/?{PASTE_ID}"),
        "deletetoken": DELETE_TOKEN,
    })
}

pub async fn mount_upload(server: &MockServer, body: Value) {
    Mock::given(method("POST"))
        .and(path("/"))
        .and(header(REQUESTED_WITH_HEADER, DEFAULT_REQUESTED_WITH))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// A stored paste as the host returns it, sealed by `RecordingEngine`.
pub fn stored_paste(text: &str) -> Value {
    json!({
        "status": 0,
        "id": PASTE_ID,
        "url": format!("/?{PASTE_ID}"),
        "v": 2,
        "adata": [[], "plaintext", 0, 0],
        "ct": text,
        "meta": { "created": 1_700_000_000, "time_to_live": 86_400 },
    })
}

pub async fn mount_paste(server: &MockServer, body: Value) {
    Mock::given(method("GET"))
        .and(path("/"))
        .and(QueryIs(PASTE_ID))
        .and(header(REQUESTED_WITH_HEADER, DEFAULT_REQUESTED_WITH))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

pub fn share_url(server: &MockServer) -> String {
    format!("{}/?{PASTE_ID}#{STUB_SECRET}", server.uri())
}

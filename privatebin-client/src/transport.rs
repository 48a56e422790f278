//! The paste protocol, independent of how requests are executed.
//!
//! Every operation is a chain of pure steps around one or two HTTP
//! exchanges. The async and blocking clients run the same steps and differ
//! only in how they send a `PasteRequest` and where crypto work runs.
//!
//! Upload: `prepare_upload` -> `version_request`/`parse_version` ->
//! `encode_upload` -> `upload_request` -> `finish_upload`.
//!
//! Download: `download_target` -> `download_request` -> `finish_download`
//! -> `decode_download`.
//!
//! Delete: `delete_target` -> `delete_request` -> `finish_delete`.

use crate::error::{PasteError, PasteResult};
use crate::reference::{
    extract_secret, normalize_server, parse_share_url, strip_secret, PasteReference,
};
use crate::response::{verify, RawResponse, ServerStatus};
use crate::types::{AttachmentSource, DecodedPaste, DeletionToken, UploadOptions, UploadedPaste};
use privatebin_crypto::{
    Attachment, Compression, CryptoEngine, EncodeRequest, EncodedPaste, Expiration, Formatter,
    PasteEnvelope,
};
use reqwest::{Method, Url};
use serde_json::{json, Value};
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Query that makes a host describe its paste schema, including the version.
const VERSION_QUERY: &str = "jsonld=paste";

/// A request for either client to execute.
#[derive(Clone, Debug)]
pub struct PasteRequest {
    pub method: Method,
    pub url: String,
    /// JSON body, if any.
    pub body: Option<Vec<u8>>,
}

impl PasteRequest {
    fn get(url: String) -> Self {
        Self {
            method: Method::GET,
            url,
            body: None,
        }
    }

    fn post_json(url: String, body: &impl serde::Serialize) -> PasteResult<Self> {
        Ok(Self {
            method: Method::POST,
            url,
            body: Some(serde_json::to_vec(body)?),
        })
    }
}

// ── Upload ──

/// Upload options after local validation, ready to encode.
pub struct PreparedUpload {
    pub server: String,
    text: Option<String>,
    attachment: Option<AttachmentSource>,
    password: Option<String>,
    formatter: Formatter,
    expiration: Expiration,
    compression: Compression,
    burn_after_reading: bool,
    discussion: bool,
}

impl fmt::Debug for PreparedUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreparedUpload")
            .field("server", &self.server)
            .field("formatter", &self.formatter)
            .field("expiration", &self.expiration)
            .field("compression", &self.compression)
            .finish_non_exhaustive()
    }
}

/// Validates everything that can be checked without the network.
pub fn prepare_upload(server: &str, options: &UploadOptions) -> PasteResult<PreparedUpload> {
    let server = validate_server(server)?;

    let text = options.text.clone().filter(|t| !t.is_empty());
    if text.is_none() && options.file.is_none() {
        return Err(PasteError::Validation(
            "text and file may not both be empty".to_string(),
        ));
    }

    let formatter = options
        .formatting
        .parse::<Formatter>()
        .map_err(PasteError::from_invalid_option)?;
    let expiration = options
        .expiration
        .parse::<Expiration>()
        .map_err(PasteError::from_invalid_option)?;
    let compression = match options.compression.as_deref() {
        Some(requested) => requested
            .parse::<Compression>()
            .map_err(PasteError::from_invalid_option)?,
        None => Compression::None,
    };

    if let Some(AttachmentSource::Path(path)) = &options.file {
        if !path.is_file() {
            return Err(PasteError::Validation(format!(
                "attachment {} is not a readable file",
                path.display()
            )));
        }
    }

    Ok(PreparedUpload {
        server,
        text,
        attachment: options.file.clone(),
        password: options.password.clone().filter(|p| !p.is_empty()),
        formatter,
        expiration,
        compression,
        burn_after_reading: options.burn_after_reading,
        discussion: options.discussion,
    })
}

fn validate_server(server: &str) -> PasteResult<String> {
    let parsed = Url::parse(server)
        .map_err(|e| PasteError::Validation(format!("invalid server URL {server:?}: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(PasteError::Validation(format!(
            "server URL {server:?} must use http or https"
        )));
    }
    if server.contains(['?', '#']) {
        return Err(PasteError::Validation(format!(
            "server URL {server:?} must not carry a query or fragment"
        )));
    }
    Ok(normalize_server(server))
}

/// GET `{server}?jsonld=paste`.
pub fn version_request(server: &str) -> PasteRequest {
    PasteRequest::get(format!("{}?{VERSION_QUERY}", normalize_server(server)))
}

/// Reads the protocol version from a host's JSON-LD paste schema.
///
/// Hosts old enough to omit the version are protocol 1. A body that is not
/// JSON means the host cannot be talked to at all.
pub fn parse_version(response: &RawResponse) -> PasteResult<u32> {
    let schema = verify(response).map_err(|_| PasteError::BadServerResponse {
        url: response.url.clone(),
        detail: "host failed to respond with PrivateBin version information".to_string(),
    })?;

    let version = match schema.pointer("/@context/v/@value").and_then(Value::as_u64) {
        Some(v) => u32::try_from(v).map_err(|_| PasteError::BadServerResponse {
            url: response.url.clone(),
            detail: format!("protocol version {v} is out of range"),
        })?,
        None => 1,
    };
    debug!(version, url = %response.url, "negotiated PrivateBin protocol version");
    Ok(version)
}

/// Loads the attachment and seals the paste. This is the CPU-bound step.
pub fn encode_upload<E: CryptoEngine + ?Sized>(
    engine: &E,
    prepared: PreparedUpload,
    protocol_version: u32,
) -> PasteResult<EncodedPaste> {
    let compression = prepared.compression.negotiate(protocol_version);
    if compression != prepared.compression {
        debug!(
            protocol_version,
            requested = %prepared.compression,
            "host predates compression, sending paste uncompressed"
        );
    }

    let attachment = match prepared.attachment {
        None => None,
        Some(AttachmentSource::Inline(attachment)) => Some(attachment),
        Some(AttachmentSource::Path(path)) => Some(load_attachment(&path)?),
    };

    let request = EncodeRequest {
        text: prepared.text.unwrap_or_default(),
        attachment,
        password: prepared.password,
        formatter: prepared.formatter,
        burn_after_reading: prepared.burn_after_reading,
        discussion: prepared.discussion,
        expiration: prepared.expiration,
        compression,
        protocol_version,
    };
    Ok(engine.encode(&request)?)
}

fn load_attachment(path: &Path) -> PasteResult<Attachment> {
    let content = std::fs::read(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "attachment".to_string());
    Ok(Attachment::new(name, content))
}

/// POST the envelope to the server root.
pub fn upload_request(server: &str, envelope: &PasteEnvelope) -> PasteResult<PasteRequest> {
    PasteRequest::post_json(normalize_server(server), envelope)
}

/// Turns the host's answer into a share URL and deletion token.
pub fn finish_upload(
    server: &str,
    secret: String,
    response: &RawResponse,
) -> PasteResult<UploadedPaste> {
    let body = verify(response)?;
    let status = ServerStatus::from_body(&body, &response.url)?.into_result()?;

    let missing = |field: &str| PasteError::BadServerResponse {
        url: response.url.clone(),
        detail: format!("upload response has no {field}"),
    };
    let id = status
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| missing("paste id"))?;
    let token = status
        .deletetoken
        .filter(|t| !t.is_empty())
        .ok_or_else(|| missing("deletion token"))?;

    debug!(paste_id = %id, "paste uploaded");
    Ok(UploadedPaste {
        reference: PasteReference::new(server, id, secret),
        deletion_token: DeletionToken::new(token),
    })
}

// ── Download ──

/// Where to fetch a paste from and the secret that opens it.
#[derive(Clone)]
pub struct DownloadTarget {
    pub url: String,
    pub secret: String,
}

impl fmt::Debug for DownloadTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownloadTarget")
            .field("url", &self.url)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Splits a share URL into the fetch URL and the secret.
///
/// Only the fragment is required, so links whose identifier is not in
/// `?{id}` form still work.
pub fn download_target(share_url: &str) -> PasteResult<DownloadTarget> {
    let secret = extract_secret(share_url)?;
    if secret.is_empty() {
        return Err(PasteError::MalformedReference(format!(
            "{:?} has an empty secret",
            strip_secret(share_url)
        )));
    }
    let url = strip_secret(share_url);
    Url::parse(url).map_err(|e| PasteError::MalformedReference(format!("{url:?}: {e}")))?;

    Ok(DownloadTarget {
        url: url.to_string(),
        secret: secret.to_string(),
    })
}

pub fn download_request(target: &DownloadTarget) -> PasteRequest {
    PasteRequest::get(target.url.clone())
}

/// A fetched, still-encrypted paste.
#[derive(Clone, Debug)]
pub struct FetchedPaste {
    pub status: ServerStatus,
    pub envelope: PasteEnvelope,
}

pub fn finish_download(response: &RawResponse) -> PasteResult<FetchedPaste> {
    let body = verify(response)?;
    let status = ServerStatus::from_body(&body, &response.url)?.into_result()?;
    let envelope = PasteEnvelope::from_value(body)?;
    Ok(FetchedPaste { status, envelope })
}

/// Decrypts a fetched paste. This is the CPU-bound step.
pub fn decode_download<E: CryptoEngine + ?Sized>(
    engine: &E,
    fetched: FetchedPaste,
    secret: &str,
    password: Option<&str>,
) -> PasteResult<DecodedPaste> {
    let password = password.filter(|p| !p.is_empty());
    let content = engine.decode(&fetched.envelope, secret, password)?;

    Ok(DecodedPaste {
        id: fetched.status.id,
        url: fetched.status.url,
        text: content.text,
        attachment: content.attachment,
        meta: fetched.envelope.get("meta").cloned().unwrap_or(Value::Null),
        status: fetched.status.status,
        version: fetched.envelope.version(),
    })
}

// ── Delete ──

/// Parses the share URL and checks the token before anything is sent.
pub fn delete_target(share_url: &str, token: &DeletionToken) -> PasteResult<PasteReference> {
    if token.as_str().is_empty() {
        return Err(PasteError::Validation(
            "deletion token must not be empty".to_string(),
        ));
    }
    let reference = parse_share_url(share_url)?;
    if reference.paste_id.is_empty() {
        return Err(PasteError::MalformedReference(format!(
            "{:?} has an empty paste identifier",
            reference.paste_url()
        )));
    }
    Ok(reference)
}

/// POST `{pasteid, deletetoken}` to the server root.
pub fn delete_request(
    reference: &PasteReference,
    token: &DeletionToken,
) -> PasteResult<PasteRequest> {
    PasteRequest::post_json(
        reference.server.clone(),
        &json!({ "pasteid": reference.paste_id, "deletetoken": token.as_str() }),
    )
}

/// Validates a delete answer.
///
/// Protocol 1 hosts answer a delete with an HTML page. That case is
/// reported as an unsupported feature rather than a broken host.
pub fn finish_delete(server: &str, response: &RawResponse) -> PasteResult<ServerStatus> {
    let body = verify(response).map_err(|err| match err {
        PasteError::BadServerResponse { .. } => {
            PasteError::UnsupportedFeature(format!("{server} does not support deleting pastes"))
        }
        other => other,
    })?;
    ServerStatus::from_body(&body, &response.url)?.into_result()
}

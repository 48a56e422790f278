//! Blocking paste client.
//!
//! Runs every step, crypto included, on the calling thread. Like reqwest's
//! blocking client it must not be used from inside an async runtime; use
//! [`crate::PasteClient`] there, or call this from `spawn_blocking`.

use crate::config::{ClientConfig, REQUESTED_WITH_HEADER};
use crate::error::PasteResult;
use crate::response::{RawResponse, ServerStatus};
use crate::transport::{self, PasteRequest};
use crate::types::{DecodedPaste, DeletionToken, UploadOptions, UploadedPaste};
use privatebin_crypto::{CryptoEngine, PrivateBinCipher};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use std::sync::Arc;
use tracing::debug;

/// Blocking client for PrivateBin hosts. Safe to share across threads.
pub struct PasteClient<E = PrivateBinCipher> {
    http: Client,
    config: Arc<ClientConfig>,
    engine: Arc<E>,
}

impl<E> Clone for PasteClient<E> {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            config: Arc::clone(&self.config),
            engine: Arc::clone(&self.engine),
        }
    }
}

impl PasteClient {
    /// Creates a client using the built-in v2 cipher.
    pub fn new(config: ClientConfig) -> PasteResult<Self> {
        Self::with_engine(config, PrivateBinCipher::default())
    }
}

impl<E: CryptoEngine> PasteClient<E> {
    pub fn with_engine(config: ClientConfig, engine: E) -> PasteResult<Self> {
        Self::with_shared_engine(config, Arc::new(engine))
    }

    pub fn with_shared_engine(config: ClientConfig, engine: Arc<E>) -> PasteResult<Self> {
        config.validate()?;
        let mut builder = Client::builder()
            .user_agent(config.user_agent.as_str())
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            // The blocking client defaults to 30s; only the config decides here.
            .timeout(config.timeout());
        if let Some(proxy) = config.proxy()? {
            builder = builder.proxy(proxy);
        }

        Ok(Self {
            http: builder.build()?,
            config: Arc::new(config),
            engine,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn protocol_version(&self, server: &str) -> PasteResult<u32> {
        let response = self.execute(transport::version_request(server))?;
        transport::parse_version(&response)
    }

    pub fn upload(&self, server: &str, options: &UploadOptions) -> PasteResult<UploadedPaste> {
        let prepared = transport::prepare_upload(server, options)?;
        let server = prepared.server.clone();
        let version = self.protocol_version(&server)?;
        let encoded = transport::encode_upload(&*self.engine, prepared, version)?;

        let request = transport::upload_request(&server, &encoded.envelope)?;
        let response = self.execute(request)?;
        transport::finish_upload(&server, encoded.secret, &response)
    }

    pub fn download(&self, share_url: &str, password: Option<&str>) -> PasteResult<DecodedPaste> {
        let target = transport::download_target(share_url)?;
        let response = self.execute(transport::download_request(&target))?;
        let fetched = transport::finish_download(&response)?;
        transport::decode_download(&*self.engine, fetched, &target.secret, password)
    }

    pub fn delete(&self, share_url: &str, token: &DeletionToken) -> PasteResult<ServerStatus> {
        let reference = transport::delete_target(share_url, token)?;
        let request = transport::delete_request(&reference, token)?;
        let response = self.execute(request)?;
        transport::finish_delete(&reference.server, &response)
    }

    fn execute(&self, request: PasteRequest) -> PasteResult<RawResponse> {
        debug!(method = %request.method, url = %request.url, "sending PrivateBin request");

        let mut builder = self
            .http
            .request(request.method, &request.url)
            .header(REQUESTED_WITH_HEADER, self.config.requested_with.as_str());
        if let Some(body) = request.body {
            builder = builder.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = builder.send()?;
        let url = response.url().to_string();
        let status = response.status().as_u16();
        let body = response.bytes()?.to_vec();
        Ok(RawResponse { url, status, body })
    }
}

pub fn send(server: &str, options: &UploadOptions) -> PasteResult<UploadedPaste> {
    PasteClient::new(ClientConfig::default())?.upload(server, options)
}

pub fn get(share_url: &str, password: Option<&str>) -> PasteResult<DecodedPaste> {
    PasteClient::new(ClientConfig::default())?.download(share_url, password)
}

pub fn delete(share_url: &str, token: &DeletionToken) -> PasteResult<ServerStatus> {
    PasteClient::new(ClientConfig::default())?.delete(share_url, token)
}

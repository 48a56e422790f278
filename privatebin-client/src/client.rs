//! Async paste client.
//!
//! Network I/O runs on the caller's scheduler through reqwest's async
//! client. Only the encode and decode steps are handed to the worker pool,
//! so other tasks keep running while a paste is being sealed or opened.

use crate::config::{ClientConfig, REQUESTED_WITH_HEADER};
use crate::error::PasteResult;
use crate::response::{RawResponse, ServerStatus};
use crate::transport::{self, PasteRequest};
use crate::types::{DecodedPaste, DeletionToken, UploadOptions, UploadedPaste};
use crate::worker::WorkerPool;
use privatebin_crypto::{CryptoEngine, PrivateBinCipher};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::sync::Arc;
use tracing::debug;

/// Async client for PrivateBin hosts.
///
/// Holds no per-call state; clones share the HTTP connection pool, the
/// engine and the worker pool.
#[derive(Debug)]
pub struct PasteClient<E = PrivateBinCipher> {
    http: Client,
    config: Arc<ClientConfig>,
    engine: Arc<E>,
    pool: WorkerPool,
}

impl<E> Clone for PasteClient<E> {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            config: Arc::clone(&self.config),
            engine: Arc::clone(&self.engine),
            pool: self.pool.clone(),
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
        let http = build_http(&config)?;
        let pool = config
            .worker_threads
            .map(WorkerPool::new)
            .unwrap_or_default();

        Ok(Self {
            http,
            config: Arc::new(config),
            engine,
            pool,
        })
    }

    /// Replaces the default pool with a caller-configured one.
    pub fn with_worker_pool(mut self, pool: WorkerPool) -> Self {
        self.pool = pool;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn worker_pool(&self) -> &WorkerPool {
        &self.pool
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Asks a host which paste protocol version it speaks.
    pub async fn protocol_version(&self, server: &str) -> PasteResult<u32> {
        let response = self.execute(transport::version_request(server)).await?;
        transport::parse_version(&response)
    }

    /// Encrypts and uploads a paste, returning its share URL and deletion token.
    ///
    /// Options are validated before any request is made. Nothing is stored on
    /// the host unless the final POST succeeds.
    pub async fn upload(&self, server: &str, options: &UploadOptions) -> PasteResult<UploadedPaste> {
        let prepared = transport::prepare_upload(server, options)?;
        let server = prepared.server.clone();
        let version = self.protocol_version(&server).await?;

        let engine = Arc::clone(&self.engine);
        let encoded = self
            .pool
            .run(move || transport::encode_upload(&*engine, prepared, version))
            .await?;

        let request = transport::upload_request(&server, &encoded.envelope)?;
        let response = self.execute(request).await?;
        transport::finish_upload(&server, encoded.secret, &response)
    }

    /// Fetches and decrypts the paste behind a share URL.
    pub async fn download(&self, share_url: &str, password: Option<&str>) -> PasteResult<DecodedPaste> {
        let target = transport::download_target(share_url)?;
        let response = self.execute(transport::download_request(&target)).await?;
        let fetched = transport::finish_download(&response)?;

        let engine = Arc::clone(&self.engine);
        let password = password.map(str::to_owned);
        self.pool
            .run(move || {
                transport::decode_download(
                    &*engine,
                    fetched,
                    &target.secret,
                    password.as_deref(),
                )
            })
            .await
    }

    /// Deletes a paste with the token returned when it was uploaded.
    pub async fn delete(&self, share_url: &str, token: &DeletionToken) -> PasteResult<ServerStatus> {
        let reference = transport::delete_target(share_url, token)?;
        let request = transport::delete_request(&reference, token)?;
        let response = self.execute(request).await?;
        transport::finish_delete(&reference.server, &response)
    }

    async fn execute(&self, request: PasteRequest) -> PasteResult<RawResponse> {
        debug!(method = %request.method, url = %request.url, "sending PrivateBin request");

        let mut builder = self
            .http
            .request(request.method, &request.url)
            .header(REQUESTED_WITH_HEADER, self.config.requested_with.as_str());
        if let Some(body) = request.body {
            builder = builder.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = builder.send().await?;
        let url = response.url().to_string();
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        Ok(RawResponse { url, status, body })
    }
}

fn build_http(config: &ClientConfig) -> PasteResult<Client> {
    let mut builder = Client::builder()
        .user_agent(config.user_agent.as_str())
        .danger_accept_invalid_certs(config.accept_invalid_certs);
    if let Some(proxy) = config.proxy()? {
        builder = builder.proxy(proxy);
    }
    if let Some(timeout) = config.timeout() {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}

/// Uploads a paste with a default client.
pub async fn send(server: &str, options: &UploadOptions) -> PasteResult<UploadedPaste> {
    PasteClient::new(ClientConfig::default())?
        .upload(server, options)
        .await
}

/// Downloads a paste with a default client.
pub async fn get(share_url: &str, password: Option<&str>) -> PasteResult<DecodedPaste> {
    PasteClient::new(ClientConfig::default())?
        .download(share_url, password)
        .await
}

/// Deletes a paste with a default client.
pub async fn delete(share_url: &str, token: &DeletionToken) -> PasteResult<ServerStatus> {
    PasteClient::new(ClientConfig::default())?
        .delete(share_url, token)
        .await
}

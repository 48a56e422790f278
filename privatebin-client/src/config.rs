//! Paste client configuration.

use crate::error::{PasteError, PasteResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Header PrivateBin hosts check before answering with JSON instead of HTML.
pub const REQUESTED_WITH_HEADER: &str = "X-Requested-With";

/// Value of [`REQUESTED_WITH_HEADER`] the hosts expect.
pub const DEFAULT_REQUESTED_WITH: &str = "JSONHttpRequest";

/// Configuration shared by the async and blocking paste clients.
///
/// Every client carries its own copy; nothing here is process-global.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    /// Value sent in the `X-Requested-With` header on every request.
    pub requested_with: String,

    /// Proxy URL applied to every scheme (e.g., "socks5://127.0.0.1:9050").
    pub proxy: Option<String>,

    /// User agent sent to the host.
    pub user_agent: String,

    /// Optional per-request timeout in milliseconds. None leaves requests unbounded.
    pub timeout_ms: Option<u64>,

    /// Skip TLS certificate verification (self-signed test hosts only).
    pub accept_invalid_certs: bool,

    /// Size of the default crypto worker pool for the async client.
    /// None uses the available parallelism.
    pub worker_threads: Option<usize>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            requested_with: DEFAULT_REQUESTED_WITH.to_string(),
            proxy: None,
            user_agent: concat!("privatebin-client/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_ms: None,
            accept_invalid_certs: false,
            worker_threads: None,
        }
    }
}

impl ClientConfig {
    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = Some(threads);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Builds the proxy, if one is configured.
    pub(crate) fn proxy(&self) -> PasteResult<Option<reqwest::Proxy>> {
        self.proxy
            .as_deref()
            .map(|url| {
                reqwest::Proxy::all(url)
                    .map_err(|e| PasteError::Config(format!("invalid proxy {url:?}: {e}")))
            })
            .transpose()
    }

    /// Checks the configuration before any client is built from it.
    pub fn validate(&self) -> PasteResult<()> {
        if self.requested_with.trim().is_empty() {
            return Err(PasteError::Config(
                "requested_with header value must not be empty".to_string(),
            ));
        }
        if self.timeout_ms == Some(0) {
            return Err(PasteError::Config(
                "timeout must be at least 1ms".to_string(),
            ));
        }
        if self.worker_threads == Some(0) {
            return Err(PasteError::Config(
                "worker_threads must be at least 1".to_string(),
            ));
        }
        self.proxy()?;
        Ok(())
    }
}

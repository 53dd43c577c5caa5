//! Character fetch pipeline.
//!
//! The service treats the upstream source as a black box behind [`Fetcher`]:
//! possibly slow, possibly failing, and tried exactly once per request.
//!
//! ### HTTP implementation
//! - GET `{upstream_url}/{id}` with `Accept: application/json`
//! - 404 maps to `NOT_FOUND`, any other non-2xx to `HTTP_ERROR`
//! - Bodies that are not JSON map to `INVALID_RESPONSE`
//! - No retries or backoff

use async_trait::async_trait;
use reqwest::{Client, StatusCode, header};
use serde_json::Value;
use std::time::{Duration, Instant};
use url::Url;

use charcache_core::{AppConfig, Error};

/// Source of character records consulted on cache miss.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the character with the given id.
    async fn fetch(&self, id: u32) -> Result<Value, Error>;
}

/// Configuration for the HTTP fetcher.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Base URL; the id is appended as the last path segment.
    pub upstream_url: String,

    /// User agent string (default: "charcache/0.1")
    pub user_agent: String,

    /// Request timeout (default: 20s)
    pub timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            upstream_url: "https://xivapi.com/character".to_string(),
            user_agent: "charcache/0.1".to_string(),
            timeout: Duration::from_millis(20000),
        }
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            upstream_url: config.upstream_url.clone(),
            user_agent: config.user_agent.clone(),
            timeout: config.timeout(),
        }
    }
}

/// JSON-over-HTTP character fetcher.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    http: Client,
    base: String,
}

impl HttpFetcher {
    /// Create a new fetcher with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        Url::parse(&config.upstream_url).map_err(|e| Error::InvalidUrl(format!("{}: {e}", config.upstream_url)))?;

        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::HttpError(format!("failed to build HTTP client: {}", e)))?;

        let base = config.upstream_url.trim_end_matches('/').to_string();

        Ok(Self { http, base })
    }

    /// URL requested for `id`.
    pub fn character_url(&self, id: u32) -> String {
        format!("{}/{}", self.base, id)
    }
}

fn transport_error(err: reqwest::Error) -> Error {
    if err.is_timeout() { Error::FetchTimeout(err.to_string()) } else { Error::HttpError(format!("network error: {err}")) }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, id: u32) -> Result<Value, Error> {
        let start = Instant::now();
        let url = self.character_url(id);

        let response = self
            .http
            .get(&url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(id));
        }
        if !status.is_success() {
            return Err(Error::HttpError(format!("status {}", status.as_u16())));
        }

        let bytes = response.bytes().await.map_err(transport_error)?;
        let record: Value = serde_json::from_slice(&bytes)
            .map_err(|e| Error::InvalidResponse(format!("character {id}: {e}")))?;

        tracing::debug!(id, url = %url, elapsed_ms = start.elapsed().as_millis() as u64, bytes = bytes.len(), "fetched character");

        Ok(record)
    }
}

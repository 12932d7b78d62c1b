//! Cookie-aware HTTP session built on reqwest.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::cookie::Jar;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

/// Per-request failures. Local to the request that produced them; the
/// session stays usable for the next call.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("failed to build HTTP client: {0}")]
    ClientInit(String),

    #[error("request to {0} failed: {1}")]
    RequestFailed(String, String),

    #[error("failed to read body from {0}: {1}")]
    BodyRead(String, String),
}

/// Issues GET requests on behalf of the generator.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches `url` and returns the full response body.
    async fn get(&self, url: &str) -> Result<String, SessionError>;
}

/// Cap on a single in-flight request, so a stalled origin cannot hold the
/// run past its deadline indefinitely.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Cookie-persisting GET issuer.
///
/// Cookies received on any response are sent on subsequent requests for the
/// lifetime of this instance. One instance is created per run and never
/// shared across runs.
pub struct HttpSession {
    client: Client,
}

impl HttpSession {
    pub fn new() -> Result<Self, SessionError> {
        let jar = Arc::new(Jar::default());
        let client = Client::builder()
            .cookie_provider(jar)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| SessionError::ClientInit(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpSession {
    async fn get(&self, url: &str) -> Result<String, SessionError> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SessionError::RequestFailed(url.to_string(), e.to_string()))?;

        response
            .text()
            .await
            .map_err(|e| SessionError::BodyRead(url.to_string(), e.to_string()))
    }
}

//! HTTP client abstraction
//!
//! The installer only ever issues GET requests; the trait seam keeps the
//! dispatcher testable without a network.

use std::io::Read;
use std::time::Duration;
use thiserror::Error;

/// Fixed ceiling for every HTTP call
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Refuse to stream bodies past this size
const MAX_BODY_BYTES: u64 = 4_000_000_000;

#[derive(Error, Debug, Clone)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(String),
}

/// Streamed response body
pub struct HttpBody {
    pub content_length: Option<u64>,
    pub reader: Box<dyn Read + Send>,
}

/// HTTP GET seam; mocked in tests
pub trait HttpFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<HttpBody, FetchError>;
}

/// Real client backed by ureq with a global timeout. Connection failures,
/// timeouts and non-2xx statuses all surface as `FetchError`.
pub struct UreqFetcher {
    agent: ureq::Agent,
}

impl UreqFetcher {
    pub fn new() -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(HTTP_TIMEOUT))
            .build();
        Self {
            agent: config.new_agent(),
        }
    }
}

impl Default for UreqFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetcher for UreqFetcher {
    fn fetch(&self, url: &str) -> Result<HttpBody, FetchError> {
        let resp = self
            .agent
            .get(url)
            .header("User-Agent", crate::USER_AGENT)
            .call()
            .map_err(|e| FetchError::Http(e.to_string()))?;

        let content_length = resp
            .headers()
            .get("Content-Length")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok());

        let reader = resp
            .into_body()
            .into_with_config()
            .limit(MAX_BODY_BYTES)
            .reader();

        Ok(HttpBody {
            content_length,
            reader: Box::new(reader),
        })
    }
}

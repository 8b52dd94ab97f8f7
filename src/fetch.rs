// 🌐 Source fetcher - raw HTML for the extraction stage
//
// `SourceFetcher` is the seam: production uses HTTP, tests hand in a
// fixed document. No retries; a failed fetch aborts the run.

use crate::error::{EtlError, Result};
use std::time::Duration;

pub trait SourceFetcher {
    /// Return the document body at `url`
    fn fetch(&self, url: &str) -> Result<String>;
}

// ============================================================================
// HTTP FETCHER
// ============================================================================

/// Blocking HTTP GET; non-2xx responses are errors
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("largest-banks/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(EtlError::HttpClient)?;

        Ok(HttpFetcher { client })
    }
}

impl SourceFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String> {
        let network = |source| EtlError::Network {
            url: url.to_string(),
            source,
        };

        self.client
            .get(url)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.text())
            .map_err(network)
    }
}

// ============================================================================
// STATIC FETCHER
// ============================================================================

/// Serves the same document for every URL
pub struct StaticFetcher {
    body: String,
}

impl StaticFetcher {
    pub fn new(body: impl Into<String>) -> Self {
        StaticFetcher { body: body.into() }
    }
}

impl SourceFetcher for StaticFetcher {
    fn fetch(&self, _url: &str) -> Result<String> {
        Ok(self.body.clone())
    }
}

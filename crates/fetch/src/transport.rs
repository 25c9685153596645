//! HTTP transport used by the scanner and the fetcher.
//!
//! The core only relies on the [`Transport`] contract: one GET, the body on
//! any 2xx status, a `Transport` error otherwise. No retries happen here.

use async_trait::async_trait;
use rand::seq::IndexedRandom;
use records::{FinderError, Result};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

/// Default per-request deadline
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// Without a browser-like user agent the source serves a spam-filter page
const USER_AGENTS: [&str; 6] = [
    "Mozilla/5.0 (Linux; Android 12; moto g stylus 5G) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/112.0.0.0 Mobile Safari/537.36",
    "Mozilla/5.0 (Linux; Android 10; MAR-LX1A) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/112.0.0.0 Mobile Safari/537.36",
    "Mozilla/5.0 (iPhone9,4; U; CPU iPhone OS 10_0_1 like Mac OS X) AppleWebKit/602.1.50 (KHTML, like Gecko) Version/10.0 Mobile/14A403 Safari/602.1",
    "Mozilla/5.0 (Linux; Android 7.0; Pixel C Build/NRD90M; wv) AppleWebKit/537.36 (KHTML, like Gecko) Version/4.0 Chrome/52.0.2743.98 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/42.0.2311.135 Safari/537.36 Edge/12.246",
    "Mozilla/5.0 (X11; Linux x86_64; rv:120.0) Gecko/20100101 Firefox/120.0",
];

/// Single-attempt GET against the web source
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch `url` and return its body
    async fn get(&self, url: &str) -> Result<String>;
}

/// [`Transport`] over reqwest with a per-request timeout and a rotating
/// user agent
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FinderError::setup("http client", e))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<String> {
        let user_agent = USER_AGENTS
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or(USER_AGENTS[0]);

        debug!(url = %url, "GET");
        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, user_agent)
            .send()
            .await
            .map_err(|e| FinderError::transport(url, None, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FinderError::transport(
                url,
                Some(status.as_u16()),
                format!("unexpected status {}", status),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| FinderError::transport(url, Some(status.as_u16()), e.to_string()))
    }
}

/// In-memory [`Transport`] answering from a fixed url table.
///
/// Unknown urls answer 404. Every requested url is recorded, which lets
/// callers assert on request order.
#[derive(Debug, Default)]
pub struct CannedTransport {
    responses: HashMap<String, std::result::Result<String, u16>>,
    requests: Mutex<Vec<String>>,
}

impl CannedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `url` with `body` and status 200
    pub fn with_body(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.responses.insert(url.into(), Ok(body.into()));
        self
    }

    /// Answer `url` with an error status
    pub fn with_status(mut self, url: impl Into<String>, status: u16) -> Self {
        self.responses.insert(url.into(), Err(status));
        self
    }

    /// Urls requested so far, in request order
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Transport for CannedTransport {
    async fn get(&self, url: &str) -> Result<String> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url.to_string());
        }

        match self.responses.get(url) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(status)) => Err(FinderError::transport(
                url,
                Some(*status),
                format!("unexpected status {}", status),
            )),
            None => Err(FinderError::transport(url, Some(404), "unexpected status 404")),
        }
    }
}

use super::{FetchListener, Fetcher, read_body};
use crate::error::{TrimError, TrimResult};
use log::{debug, info};
use reqwest::blocking::Client;
use std::time::Duration;

/// Default time allowed to establish a connection
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

const USER_AGENT: &str = concat!("audio-trim/", env!("CARGO_PKG_VERSION"));

/// Fetcher for `http://` and `https://` URLs
///
/// No retries: a failed transfer is reported to the caller as is.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher with the default connect timeout and no overall deadline
    pub fn new() -> TrimResult<Self> {
        Self::with_timeouts(DEFAULT_CONNECT_TIMEOUT, None)
    }

    /// Create a fetcher with explicit timeouts
    ///
    /// `total` bounds the whole transfer including the body; `None` lets a
    /// large download run as long as data keeps arriving.
    pub fn with_timeouts(connect: Duration, total: Option<Duration>) -> TrimResult<Self> {
        let client = Client::builder()
            .connect_timeout(connect)
            .timeout(total)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| TrimError::Network(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(client))
    }

    /// Wrap a preconfigured client (proxies, TLS settings, ...)
    pub fn with_client(client: Client) -> Self {
        HttpFetcher { client }
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str, listener: &mut dyn FetchListener) -> TrimResult<Vec<u8>> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().map_err(|e| {
            if e.is_timeout() {
                TrimError::Network(format!("timed out connecting to {}", url))
            } else {
                TrimError::Network(format!("failed to fetch {}: {}", url, e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TrimError::Network(format!(
                "failed to fetch audio: HTTP {}",
                status
            )));
        }

        let total = response.content_length();
        match total {
            Some(len) => info!("Downloading {} bytes from {}", len, url),
            None => info!("Downloading {} (size unknown)", url),
        }

        read_body(response, total, listener)
    }
}

//! HTTP transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use crate::config::Config;
use crate::error::{FetchError, Result, TypingsError};

/// Fetches the body of a URL as text.
///
/// This is the only place network I/O happens; everything above it works on
/// strings, which is what lets tests run the resolver against canned
/// responses.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GETs `url`, failing on transport errors and non-2xx statuses.
    async fn fetch_text(&self, url: &str) -> std::result::Result<String, FetchError>;
}

/// [`Fetcher`] backed by a `reqwest` client.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a client using the timeouts and user agent from `config`.
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .connect_timeout(Duration::from_secs(config.connect_timeout))
            .pool_max_idle_per_host(20)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| TypingsError::Config(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    #[instrument(skip(self))]
    async fn fetch_text(&self, url: &str) -> std::result::Result<String, FetchError> {
        debug!("GET {}", url);

        let transport = |e: reqwest::Error| FetchError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        };

        let response = self.client.get(url).send().await.map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                status_text: status
                    .canonical_reason()
                    .map(str::to_string)
                    .unwrap_or_else(|| status.as_u16().to_string()),
            });
        }

        response.text().await.map_err(transport)
    }
}

//! Upstream snapshot fetch.
//!
//! `Scraper` is the seam between the exporter and the network; tests plug in
//! an in-memory implementation.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use chronex_core::error::{ChronexError, Result};

use crate::config::UpstreamSection;

/// Source of raw snapshot documents.
#[async_trait]
pub trait Scraper: Send + Sync {
    async fn scrape(&self) -> Result<Bytes>;
}

/// HTTP scraper for a Dropwizard `/metrics` endpoint.
pub struct HttpScraper {
    client: reqwest::Client,
    metrics_url: String,
    ping_url: String,
    retry_interval: Duration,
}

impl HttpScraper {
    pub fn new(cfg: &UpstreamSection) -> Result<Self> {
        let timeout = Duration::from_millis(cfg.timeout_ms);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .danger_accept_invalid_certs(cfg.insecure_skip_verify)
            .build()
            .map_err(|e| ChronexError::Internal(format!("http client build failed: {e}")))?;

        Ok(Self {
            client,
            metrics_url: cfg.url(&cfg.metrics_path),
            ping_url: cfg.url(&cfg.ping_path),
            retry_interval: Duration::from_millis(cfg.retry_interval_ms),
        })
    }

    /// Succeeds only when the ping endpoint answers 200.
    pub async fn ping(&self) -> Result<()> {
        let response = self
            .client
            .get(&self.ping_url)
            .send()
            .await
            .map_err(|e| ChronexError::Upstream(format!("ping failed: {e}")))?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(ChronexError::Upstream(format!(
                "ping returned {}",
                response.status()
            )));
        }
        tracing::debug!(url = %self.ping_url, "connected to upstream");
        Ok(())
    }

    /// Block startup until the upstream answers its ping.
    pub async fn wait_until_connected(&self) {
        loop {
            match self.ping().await {
                Ok(()) => return,
                Err(e) => {
                    tracing::debug!(error = %e, "problem connecting to upstream");
                    tracing::info!(
                        retry_in = ?self.retry_interval,
                        "couldn't connect to upstream, trying again"
                    );
                    tokio::time::sleep(self.retry_interval).await;
                }
            }
        }
    }
}

#[async_trait]
impl Scraper for HttpScraper {
    async fn scrape(&self) -> Result<Bytes> {
        let response = self
            .client
            .get(&self.metrics_url)
            .send()
            .await
            .map_err(|e| ChronexError::Upstream(format!("fetch failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChronexError::Upstream(format!("metrics endpoint returned {status}")));
        }

        response
            .bytes()
            .await
            .map_err(|e| ChronexError::Upstream(format!("read body failed: {e}")))
    }
}

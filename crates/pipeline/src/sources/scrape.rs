//! Live-scrape producer.
//!
//! The browser-driven extraction itself runs in an external sidecar (the
//! DOM selectors are site-specific and live there); this producer fetches
//! the sidecar's JSON snapshot endpoint over HTTP.

use async_trait::async_trait;
use common::config::ScrapeSourceConfig;
use common::{Error, RawRecord, RawSnapshot, Result};
use tracing::debug;

use super::Producer;

/// Producer backed by the scraper sidecar's snapshot endpoint.
#[derive(Debug, Clone)]
pub struct ScrapeSource {
    client: reqwest::Client,
    snapshot_url: String,
}

impl ScrapeSource {
    pub fn new(cfg: &ScrapeSourceConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("weather-gateway/0.1 (forecast dashboard)")
            .timeout(std::time::Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|e| Error::Scrape(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            snapshot_url: cfg.snapshot_url.clone(),
        })
    }
}

#[async_trait]
impl Producer for ScrapeSource {
    fn name(&self) -> &str {
        "scrape"
    }

    async fn produce(&self) -> Result<Vec<RawRecord>> {
        debug!("Fetching scrape snapshot: {}", self.snapshot_url);

        let resp = self
            .client
            .get(&self.snapshot_url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| Error::Scrape(format!("HTTP error: {}", e)))?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Scrape(format!(
                "snapshot endpoint returned {}: {}",
                status,
                &body[..body.len().min(500)]
            )));
        }

        let snapshot: RawSnapshot = resp
            .json()
            .await
            .map_err(|e| Error::Scrape(format!("JSON parse error: {}", e)))?;

        debug!("Scrape snapshot carries {} rows", snapshot.data.len());
        Ok(snapshot.data)
    }
}

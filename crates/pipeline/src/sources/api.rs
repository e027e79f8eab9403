//! Third-party API producer.

use async_trait::async_trait;
use common::config::{LocationConfig, OpenWeatherConfig};
use common::{RawRecord, Result};
use openweather_client::OpenWeatherClient;

use super::Producer;

/// Producer backed by the OpenWeatherMap API.
#[derive(Debug, Clone)]
pub struct ApiSource {
    client: OpenWeatherClient,
    location: LocationConfig,
}

impl ApiSource {
    pub fn new(cfg: &OpenWeatherConfig, location: LocationConfig) -> Result<Self> {
        Ok(Self {
            client: OpenWeatherClient::new(cfg)?,
            location,
        })
    }
}

#[async_trait]
impl Producer for ApiSource {
    fn name(&self) -> &str {
        "openweather"
    }

    async fn produce(&self) -> Result<Vec<RawRecord>> {
        self.client.get_observations(&self.location).await
    }
}

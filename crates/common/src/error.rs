//! Unified error type for the weather gateway.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Scrape source error: {0}")]
    Scrape(String),

    #[error("OpenWeatherMap API error: {0}")]
    OpenWeather(String),

    #[error("Snapshot file error: {0}")]
    Snapshot(String),

    #[error("Empty result: {0}")]
    EmptyResult(String),

    #[error("Rate limited — retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("All data sources failed: {0}")]
    SourceExhausted(String),

    #[error("No weather data available from any source and no cached data present")]
    NoDataAvailable,
}

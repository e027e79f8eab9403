//! Gateway configuration types.

use serde::{Deserialize, Serialize};

/// Top-level gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// The single location this gateway serves.
    #[serde(default)]
    pub location: LocationConfig,

    /// Cache behavior.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Per-client rate limiting.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Maximum hourly entries in a response payload.
    #[serde(default = "default_horizon_hours")]
    pub horizon_hours: usize,

    /// Data source settings, in fallback priority order.
    #[serde(default)]
    pub sources: SourcesConfig,
}

/// The forecast location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Human-readable name.
    pub name: String,
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lon: f64,
}

/// Cache tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Seconds before a cached payload is considered stale.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

/// Rate limiter tuning.
///
/// Deployments fronting the scrape sidecar typically lower
/// `requests_per_minute` (the sidecar drives a real browser).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Requests allowed per client per window.
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u32,

    /// Window length in seconds.
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

/// Settings for every producer in the fallback chain.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourcesConfig {
    #[serde(default)]
    pub scrape: ScrapeSourceConfig,

    #[serde(default)]
    pub openweather: OpenWeatherConfig,

    #[serde(default)]
    pub snapshot_file: SnapshotFileConfig,

    #[serde(default)]
    pub synthetic: SyntheticConfig,
}

/// The live-scrape producer: an external browser-automation sidecar that
/// exposes the already-extracted page data as a JSON snapshot endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeSourceConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Snapshot endpoint of the scraper sidecar.
    #[serde(default = "default_scrape_url")]
    pub snapshot_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_source_timeout")]
    pub timeout_secs: u64,
}

/// The OpenWeatherMap producer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenWeatherConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// API key; the producer is skipped when empty.
    #[serde(default)]
    pub api_key: String,

    /// Units system passed to the API.
    #[serde(default = "default_units")]
    pub units: String,

    /// Description language passed to the API.
    #[serde(default = "default_lang")]
    pub lang: String,

    /// Request timeout in seconds.
    #[serde(default = "default_source_timeout")]
    pub timeout_secs: u64,
}

/// The persisted-snapshot producer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotFileConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Path of the snapshot written after each fresh fetch.
    #[serde(default = "default_snapshot_path")]
    pub path: String,
}

/// The synthetic generator, the chain's last resort.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntheticConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Seed for the deterministic generator.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

// ── Defaults ──────────────────────────────────────────────────────────

fn default_true() -> bool {
    true
}

fn default_ttl_secs() -> u64 {
    600
}

fn default_requests_per_minute() -> u32 {
    10
}
fn default_window_secs() -> u64 {
    60
}

fn default_horizon_hours() -> usize {
    48
}

fn default_scrape_url() -> String {
    "http://127.0.0.1:8700/weather/snapshot".into()
}

fn default_source_timeout() -> u64 {
    30
}

fn default_units() -> String {
    "metric".into()
}
fn default_lang() -> String {
    "en".into()
}

fn default_snapshot_path() -> String {
    "data/weather_snapshot.json".into()
}

fn default_seed() -> u64 {
    7
}

fn default_location() -> LocationConfig {
    LocationConfig {
        name: "Guangyuan".into(),
        lat: 32.4301,
        lon: 106.0994,
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        default_location()
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: default_requests_per_minute(),
            window_secs: default_window_secs(),
        }
    }
}

impl Default for ScrapeSourceConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            snapshot_url: default_scrape_url(),
            timeout_secs: default_source_timeout(),
        }
    }
}

impl Default for OpenWeatherConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            api_key: String::new(),
            units: default_units(),
            lang: default_lang(),
            timeout_secs: default_source_timeout(),
        }
    }
}

impl Default for SnapshotFileConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_snapshot_path(),
        }
    }
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            seed: default_seed(),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            location: default_location(),
            cache: CacheConfig::default(),
            rate_limit: RateLimitConfig::default(),
            horizon_hours: default_horizon_hours(),
            sources: SourcesConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_usable() {
        let cfg = GatewayConfig::default();
        assert_eq!(cfg.cache.ttl_secs, 600);
        assert_eq!(cfg.rate_limit.requests_per_minute, 10);
        assert_eq!(cfg.rate_limit.window_secs, 60);
        assert_eq!(cfg.horizon_hours, 48);
        assert!(cfg.sources.synthetic.enabled);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let cfg: GatewayConfig = toml::from_str(
            r#"
            [cache]
            ttl_secs = 120

            [sources.scrape]
            enabled = false
            "#,
        )
        .expect("partial config should parse");

        assert_eq!(cfg.cache.ttl_secs, 120);
        assert!(!cfg.sources.scrape.enabled);
        assert!(cfg.sources.openweather.enabled, "untouched sections keep defaults");
        assert_eq!(cfg.rate_limit.requests_per_minute, 10);
    }
}

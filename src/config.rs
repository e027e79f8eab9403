//! Configuration loader — merges defaults, config.toml, and env vars.

use common::config::GatewayConfig;
use common::Error;
use std::path::Path;

fn parse_positive_u64(raw: &str, env_name: &str) -> Result<u64, Error> {
    let parsed = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| Error::Config(format!("{env_name} must be an integer > 0")))?;
    if parsed == 0 {
        return Err(Error::Config(format!("{env_name} must be an integer > 0")));
    }
    Ok(parsed)
}

fn parse_positive_u32(raw: &str, env_name: &str) -> Result<u32, Error> {
    Ok(parse_positive_u64(raw, env_name)? as u32)
}

fn parse_bool(raw: &str) -> bool {
    let lowered = raw.trim().to_ascii_lowercase();
    lowered != "0" && lowered != "false" && lowered != "no" && lowered != "off"
}

fn validate_config(config: &GatewayConfig) -> Result<(), Error> {
    let mut issues: Vec<String> = Vec::new();

    if config.location.name.trim().is_empty() {
        issues.push("location.name must not be empty".into());
    }
    if !(-90.0..=90.0).contains(&config.location.lat) {
        issues.push("location.lat must be within [-90, 90]".into());
    }
    if !(-180.0..=180.0).contains(&config.location.lon) {
        issues.push("location.lon must be within [-180, 180]".into());
    }

    if config.cache.ttl_secs == 0 {
        issues.push("cache.ttl_secs must be > 0".into());
    }
    if config.rate_limit.requests_per_minute == 0 {
        issues.push("rate_limit.requests_per_minute must be > 0".into());
    }
    if config.rate_limit.window_secs == 0 {
        issues.push("rate_limit.window_secs must be > 0".into());
    }
    if config.horizon_hours == 0 || config.horizon_hours > 168 {
        issues.push("horizon_hours must be within 1..=168".into());
    }

    if config.sources.scrape.enabled && config.sources.scrape.snapshot_url.trim().is_empty() {
        issues.push("sources.scrape.snapshot_url must not be empty when enabled".into());
    }
    if config.sources.scrape.enabled && config.sources.scrape.timeout_secs == 0 {
        issues.push("sources.scrape.timeout_secs must be > 0".into());
    }
    if config.sources.openweather.enabled && config.sources.openweather.timeout_secs == 0 {
        issues.push("sources.openweather.timeout_secs must be > 0".into());
    }
    if config.sources.snapshot_file.enabled && config.sources.snapshot_file.path.trim().is_empty() {
        issues.push("sources.snapshot_file.path must not be empty when enabled".into());
    }

    let openweather_usable = config.sources.openweather.enabled
        && !config.sources.openweather.api_key.trim().is_empty();
    let any_source = config.sources.scrape.enabled
        || openweather_usable
        || config.sources.snapshot_file.enabled
        || config.sources.synthetic.enabled;
    if !any_source {
        issues.push("at least one data source must be enabled (openweather also needs an api_key)".into());
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "Invalid config:\n - {}",
            issues.join("\n - ")
        )))
    }
}

/// Load gateway configuration from environment and optional config file.
pub fn load_config() -> Result<GatewayConfig, Error> {
    // 1. Load .env file from project root or parent directories.
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env file loaded: {}", e);
    }

    // 2. Start with defaults.
    let mut config = GatewayConfig::default();

    // 3. Try loading config.toml if it exists.
    let config_path = Path::new("config.toml");
    if config_path.exists() {
        let contents = std::fs::read_to_string(config_path)
            .map_err(|e| Error::Config(format!("Failed to read config.toml: {}", e)))?;
        config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config.toml: {}", e)))?;
    }

    // 4. Override with environment variables (highest priority).
    if let Ok(key) = std::env::var("OPENWEATHER_API_KEY") {
        config.sources.openweather.api_key = key;
    }
    if let Ok(raw) = std::env::var("WEATHER_CACHE_TTL_SECS") {
        config.cache.ttl_secs = parse_positive_u64(&raw, "WEATHER_CACHE_TTL_SECS")?;
    }
    if let Ok(raw) = std::env::var("WEATHER_RATE_LIMIT_PER_MINUTE") {
        config.rate_limit.requests_per_minute =
            parse_positive_u32(&raw, "WEATHER_RATE_LIMIT_PER_MINUTE")?;
    }
    if let Ok(raw) = std::env::var("WEATHER_RATE_WINDOW_SECS") {
        config.rate_limit.window_secs = parse_positive_u64(&raw, "WEATHER_RATE_WINDOW_SECS")?;
    }
    if let Ok(raw) = std::env::var("WEATHER_HORIZON_HOURS") {
        config.horizon_hours = parse_positive_u64(&raw, "WEATHER_HORIZON_HOURS")? as usize;
    }
    if let Ok(url) = std::env::var("WEATHER_SCRAPE_SNAPSHOT_URL") {
        config.sources.scrape.snapshot_url = url;
    }
    if let Ok(raw) = std::env::var("WEATHER_SCRAPE_ENABLED") {
        config.sources.scrape.enabled = parse_bool(&raw);
    }
    if let Ok(path) = std::env::var("WEATHER_SNAPSHOT_FILE") {
        config.sources.snapshot_file.path = path;
    }
    if let Ok(raw) = std::env::var("WEATHER_SYNTHETIC_SEED") {
        config.sources.synthetic.seed = raw
            .trim()
            .parse::<u64>()
            .map_err(|_| Error::Config("WEATHER_SYNTHETIC_SEED must be an integer".into()))?;
    }

    // 5. Validate.
    validate_config(&config)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = GatewayConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_zero_ttl_is_rejected() {
        let mut config = GatewayConfig::default();
        config.cache.ttl_secs = 0;
        let err = validate_config(&config).expect_err("zero TTL invalid");
        assert!(err.to_string().contains("cache.ttl_secs"));
    }

    #[test]
    fn test_all_sources_disabled_is_rejected() {
        let mut config = GatewayConfig::default();
        config.sources.scrape.enabled = false;
        config.sources.openweather.enabled = false;
        config.sources.snapshot_file.enabled = false;
        config.sources.synthetic.enabled = false;
        let err = validate_config(&config).expect_err("no sources invalid");
        assert!(err.to_string().contains("at least one data source"));
    }

    #[test]
    fn test_keyless_openweather_does_not_count_as_a_source() {
        let mut config = GatewayConfig::default();
        config.sources.scrape.enabled = false;
        config.sources.snapshot_file.enabled = false;
        config.sources.synthetic.enabled = false;
        // openweather stays enabled but has no key.
        let err = validate_config(&config).expect_err("keyless API is unusable");
        assert!(err.to_string().contains("api_key"));
    }

    #[test]
    fn test_parse_bool_accepts_common_spellings() {
        assert!(parse_bool("true"));
        assert!(parse_bool("1"));
        assert!(!parse_bool("off"));
        assert!(!parse_bool("FALSE"));
    }
}

//! Weather gateway: demand-driven forecast acquisition.
//!
//! One-shot Tokio binary that:
//! 1. Assembles the source chain from config (scrape sidecar,
//!    OpenWeatherMap, persisted snapshot, synthetic generator)
//! 2. Runs a request through the rate-limited, cached orchestrator
//! 3. Prints the response envelope as JSON
//! 4. Persists fresh payloads for the snapshot-file fallback
//!
//! HTTP routing is a thin edge concern and lives outside this binary;
//! an edge layer calls the same orchestrator surface per request.

mod config;

use std::fs::create_dir_all;
use std::path::Path;

use clap::Parser;
use serde_json::json;
use tracing::{error, info, warn};

use common::config::GatewayConfig;
use common::types::now_iso;
use common::{ObservationRecord, WeatherResponse};
use pipeline::{ApiSource, FileSource, Orchestrator, ScrapeSource, SourceChain, SyntheticSource};

/// Weather data-acquisition gateway
#[derive(Parser)]
#[command(name = "weather-gateway", about = "Rate-limited, cached weather data gateway")]
struct Cli {
    /// Probe each configured data source once and exit.
    #[arg(long)]
    check_sources: bool,

    /// Client identifier for the rate limiter (defaults to the shared
    /// "unknown" bucket).
    #[arg(long)]
    client: Option<String>,

    /// Print the gateway status report after handling the request.
    #[arg(long)]
    status: bool,
}

fn build_chain(cfg: &GatewayConfig) -> Result<SourceChain, common::Error> {
    let mut producers: Vec<Box<dyn pipeline::Producer>> = Vec::new();

    if cfg.sources.scrape.enabled {
        producers.push(Box::new(ScrapeSource::new(&cfg.sources.scrape)?));
    }

    if cfg.sources.openweather.enabled {
        if cfg.sources.openweather.api_key.trim().is_empty() {
            warn!("OpenWeatherMap source enabled but no API key set, skipping it");
        } else {
            producers.push(Box::new(ApiSource::new(
                &cfg.sources.openweather,
                cfg.location.clone(),
            )?));
        }
    }

    if cfg.sources.snapshot_file.enabled {
        producers.push(Box::new(FileSource::new(&cfg.sources.snapshot_file.path)));
    }

    if cfg.sources.synthetic.enabled {
        producers.push(Box::new(SyntheticSource::new(
            cfg.sources.synthetic.seed,
            cfg.horizon_hours,
        )));
    }

    Ok(SourceChain::new(producers))
}

fn persist_snapshot(path: &str, records: &[ObservationRecord]) {
    let write_result = (|| -> std::io::Result<()> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                create_dir_all(parent)?;
            }
        }
        let snapshot = json!({
            "timestamp": now_iso(),
            "data": records,
        });
        std::fs::write(path, serde_json::to_string_pretty(&snapshot)?)
    })();

    match write_result {
        Ok(()) => info!("💾 Snapshot persisted to {}", path),
        Err(e) => warn!("Snapshot write to {} failed: {}", path, e),
    }
}

async fn run_source_check(chain: &SourceChain) -> bool {
    let mut all_ok = true;
    for producer in chain.producers() {
        match producer.produce().await {
            Ok(rows) => info!("✅ Source '{}' returned {} rows", producer.name(), rows.len()),
            Err(e) => {
                error!("❌ Source '{}' failed: {}", producer.name(), e);
                all_ok = false;
            }
        }
    }
    all_ok
}

#[tokio::main]
async fn main() {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "weather_gateway=info,pipeline=info,openweather_client=info".into()
            }),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();

    info!("🌤️  Weather gateway starting up...");

    // Load configuration.
    let cfg = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    info!("Location: {} ({}, {})", cfg.location.name, cfg.location.lat, cfg.location.lon);
    info!(
        "Cache: ttl={}s; rate limit: {}/{}s; horizon: {}h",
        cfg.cache.ttl_secs,
        cfg.rate_limit.requests_per_minute,
        cfg.rate_limit.window_secs,
        cfg.horizon_hours,
    );

    let chain = match build_chain(&cfg) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to assemble source chain: {}", e);
            std::process::exit(1);
        }
    };

    if chain.is_empty() {
        error!("No usable data sources configured");
        std::process::exit(1);
    }

    let source_names: Vec<&str> = chain.producers().iter().map(|p| p.name()).collect();
    info!("Source chain: {:?}", source_names);

    // ── Check-sources mode ───────────────────────────────────────────
    if cli.check_sources {
        info!("Probing each source...");
        let ok = run_source_check(&chain).await;
        if !ok {
            std::process::exit(1);
        }
        return;
    }

    // ── One demand-driven request ────────────────────────────────────
    let orchestrator = Orchestrator::new(&cfg, chain);
    let response: WeatherResponse = orchestrator.handle_request(cli.client.as_deref()).await;

    if response.cached == Some(false) && cfg.sources.snapshot_file.enabled {
        if let Some(data) = &response.data {
            persist_snapshot(&cfg.sources.snapshot_file.path, data);
        }
    }

    match serde_json::to_string_pretty(&response) {
        Ok(body) => println!("{}", body),
        Err(e) => {
            error!("Failed to serialize response: {}", e);
            std::process::exit(1);
        }
    }

    if cli.status {
        match serde_json::to_string_pretty(&orchestrator.status()) {
            Ok(body) => println!("{}", body),
            Err(e) => warn!("Failed to serialize status report: {}", e),
        }
    }

    if !response.success {
        std::process::exit(1);
    }
}

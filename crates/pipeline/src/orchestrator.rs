//! Request orchestration.
//!
//! Composes the rate limiter, the TTL cache, and the source chain into
//! the full acquisition flow: admit → cache → chain walk → cache write,
//! degrading to stale cached data when every source fails. Every path
//! resolves to a well-formed response envelope; nothing here panics a
//! request away.

use std::time::{Duration, Instant};

use common::config::GatewayConfig;
use common::types::{format_uptime, now_iso, StatusReport, UptimeStatus};
use common::{ClearResponse, Error, WeatherResponse};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::cache::TtlCache;
use crate::rate_limit::RateLimiter;
use crate::sources::SourceChain;

/// Bucket used when a request carries no client identity.
const UNKNOWN_CLIENT: &str = "unknown";

/// The gateway core: one instance per process, shared across requests.
pub struct Orchestrator {
    limiter: RateLimiter,
    cache: TtlCache,
    chain: SourceChain,
    horizon: usize,
    /// Serializes concurrent cache-miss refreshes; waiters re-check the
    /// cache after acquiring it instead of walking the chain again.
    refresh_lock: Mutex<()>,
    started_at: Instant,
}

impl Orchestrator {
    pub fn new(cfg: &GatewayConfig, chain: SourceChain) -> Self {
        Self {
            limiter: RateLimiter::new(
                cfg.rate_limit.requests_per_minute,
                Duration::from_secs(cfg.rate_limit.window_secs),
            ),
            cache: TtlCache::new(Duration::from_secs(cfg.cache.ttl_secs)),
            chain,
            horizon: cfg.horizon_hours,
            refresh_lock: Mutex::new(()),
            started_at: Instant::now(),
        }
    }

    /// Handle one inbound data request end to end.
    pub async fn handle_request(&self, client_id: Option<&str>) -> WeatherResponse {
        let client = client_id.unwrap_or(UNKNOWN_CLIENT);

        let admission = self.limiter.admit(client);
        if !admission.allowed {
            let retry_after = admission.retry_after_secs.unwrap_or(1);
            warn!("Rate limited client '{}', retry in {}s", client, retry_after);
            return WeatherResponse::rate_limited(retry_after);
        }

        if let Some(entry) = self.cache.read() {
            info!("Serving cached data ({} records)", entry.records.len());
            return WeatherResponse::cached(entry.records, entry.written_at_utc);
        }

        self.refresh(client).await
    }

    /// Cache-miss path: walk the chain under the single-flight lock.
    async fn refresh(&self, client: &str) -> WeatherResponse {
        let _guard = self.refresh_lock.lock().await;

        // Another request may have refreshed while we waited.
        if let Some(entry) = self.cache.read() {
            info!("Serving data refreshed by a concurrent request");
            return WeatherResponse::cached(entry.records, entry.written_at_utc);
        }

        info!("Cache miss for client '{}', walking source chain", client);
        match self.chain.fetch(self.horizon).await {
            Ok((records, source)) => {
                self.cache.write(records.clone());
                info!("Got {} records from source '{}'", records.len(), source);
                WeatherResponse::fresh(records, &source)
            }
            Err(exhausted) => self.serve_stale_or_fail(&exhausted),
        }
    }

    fn serve_stale_or_fail(&self, exhausted: &Error) -> WeatherResponse {
        match self.cache.read_stale() {
            Some(entry) => {
                warn!(
                    "All sources failed, serving stale cache ({}s old): {}",
                    entry.age().as_secs(),
                    exhausted
                );
                WeatherResponse::stale(entry.records, entry.written_at_utc, &exhausted.to_string())
            }
            None => {
                error!("{}: {}", Error::NoDataAvailable, exhausted);
                WeatherResponse::failure(&exhausted.to_string())
            }
        }
    }

    /// Administrative cache clear.
    pub fn clear_cache(&self) -> ClearResponse {
        self.cache.clear();
        info!("Cache cleared by administrative request");
        ClearResponse {
            success: true,
            message: "cache cleared".to_string(),
            timestamp: now_iso(),
        }
    }

    /// Drop expired rate windows; safe to call from a housekeeping timer.
    pub fn sweep_rate_windows(&self) {
        self.limiter.sweep_expired();
    }

    /// Operational snapshot for the status surface.
    pub fn status(&self) -> StatusReport {
        let uptime = self.started_at.elapsed().as_secs();
        StatusReport {
            success: true,
            status: "running".to_string(),
            uptime: UptimeStatus {
                seconds: uptime,
                human: format_uptime(uptime),
            },
            cache: self.cache.status(),
            rate_limiting: self.limiter.status(),
            timestamp: now_iso(),
        }
    }
}

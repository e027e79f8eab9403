//! Per-client request-rate limiter.
//!
//! Fixed window per client identifier: the first request in a window
//! starts it, later requests count against it, and the window resets once
//! its duration has fully elapsed. Rejections carry a retry hint.
//!
//! Uses `DashMap` so concurrent clients only contend on their own key.

use std::time::{Duration, Instant};

use common::types::RateLimiterStatus;
use dashmap::DashMap;
use tracing::debug;

/// Counter state for one client identifier.
#[derive(Debug, Clone)]
struct RateWindow {
    count: u32,
    window_start: Instant,
}

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    pub allowed: bool,
    /// Seconds until the window resets; set only on rejection.
    pub retry_after_secs: Option<u64>,
}

impl Admission {
    fn allowed() -> Self {
        Self {
            allowed: true,
            retry_after_secs: None,
        }
    }

    fn rejected(retry_after_secs: u64) -> Self {
        Self {
            allowed: false,
            retry_after_secs: Some(retry_after_secs),
        }
    }
}

/// Fixed-window rate limiter keyed by client identifier.
#[derive(Debug)]
pub struct RateLimiter {
    windows: DashMap<String, RateWindow>,
    limit: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            windows: DashMap::new(),
            limit,
            window,
        }
    }

    /// Admit or reject a request from `client_id`.
    pub fn admit(&self, client_id: &str) -> Admission {
        self.admit_at(client_id, Instant::now())
    }

    /// Admission check against an explicit clock reading.
    pub fn admit_at(&self, client_id: &str, now: Instant) -> Admission {
        let mut entry = self
            .windows
            .entry(client_id.to_string())
            .or_insert_with(|| RateWindow {
                count: 0,
                window_start: now,
            });
        let window = entry.value_mut();

        // A window that has fully elapsed restarts; the boundary itself
        // counts as elapsed so a client is never penalized across it.
        if now.duration_since(window.window_start) >= self.window {
            window.count = 0;
            window.window_start = now;
        }

        window.count = window.count.saturating_add(1);
        if window.count > self.limit {
            let elapsed = now.duration_since(window.window_start);
            let remaining = self.window.saturating_sub(elapsed);
            let retry_after = (remaining.as_millis() as u64).div_ceil(1000).max(1);
            debug!(
                "Rate limit hit for {}: {} > {}, retry in {}s",
                client_id, window.count, self.limit, retry_after
            );
            return Admission::rejected(retry_after);
        }

        Admission::allowed()
    }

    /// Drop windows whose duration has fully elapsed. Optional hygiene:
    /// stale windows reset on next use anyway, this just bounds the map.
    pub fn sweep_expired(&self) {
        self.sweep_expired_at(Instant::now());
    }

    fn sweep_expired_at(&self, now: Instant) {
        let before = self.windows.len();
        self.windows
            .retain(|_, w| now.duration_since(w.window_start) < self.window);
        let dropped = before - self.windows.len();
        if dropped > 0 {
            debug!("Swept {} expired rate windows", dropped);
        }
    }

    /// Number of client identifiers currently tracked.
    pub fn active_clients(&self) -> usize {
        self.windows.len()
    }

    pub fn status(&self) -> RateLimiterStatus {
        RateLimiterStatus {
            active_clients: self.active_clients(),
            limit: self.limit,
            window_seconds: self.window.as_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_admits_up_to_limit() {
        let limiter = RateLimiter::new(10, Duration::from_secs(60));
        let t0 = Instant::now();

        for i in 0..10 {
            let admission = limiter.admit_at("client-a", t0);
            assert!(admission.allowed, "request {} should be admitted", i + 1);
        }

        let eleventh = limiter.admit_at("client-a", t0);
        assert!(!eleventh.allowed, "request 11 must be rejected");
        let retry = eleventh.retry_after_secs.expect("rejection carries a retry hint");
        assert!(retry > 0 && retry <= 60);
    }

    #[test]
    fn test_window_resets_after_duration() {
        let limiter = RateLimiter::new(10, Duration::from_secs(60));
        let t0 = Instant::now();

        for _ in 0..11 {
            limiter.admit_at("client-a", t0);
        }

        let after_window = limiter.admit_at("client-a", t0 + Duration::from_secs(61));
        assert!(after_window.allowed, "a fresh window starts after the old one elapses");
        assert!(after_window.retry_after_secs.is_none());
    }

    #[test]
    fn test_reset_is_inclusive_at_the_boundary() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let t0 = Instant::now();

        assert!(limiter.admit_at("client-a", t0).allowed);
        assert!(!limiter.admit_at("client-a", t0 + Duration::from_secs(30)).allowed);
        assert!(
            limiter.admit_at("client-a", t0 + Duration::from_secs(60)).allowed,
            "exactly one window later counts as a fresh window"
        );
    }

    #[test]
    fn test_clients_do_not_share_windows() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));
        let t0 = Instant::now();

        assert!(limiter.admit_at("client-a", t0).allowed);
        assert!(limiter.admit_at("client-a", t0).allowed);
        assert!(!limiter.admit_at("client-a", t0).allowed);

        assert!(
            limiter.admit_at("client-b", t0).allowed,
            "another client keeps its own budget"
        );
        assert_eq!(limiter.active_clients(), 2);
    }

    #[test]
    fn test_retry_hint_shrinks_as_window_ages() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let t0 = Instant::now();

        limiter.admit_at("client-a", t0);
        let early = limiter.admit_at("client-a", t0 + Duration::from_secs(10));
        let late = limiter.admit_at("client-a", t0 + Duration::from_secs(50));

        assert_eq!(early.retry_after_secs, Some(50));
        assert_eq!(late.retry_after_secs, Some(10));
    }

    #[test]
    fn test_sweep_drops_only_expired_windows() {
        let limiter = RateLimiter::new(10, Duration::from_secs(60));
        let t0 = Instant::now();

        limiter.admit_at("old-client", t0);
        limiter.admit_at("new-client", t0 + Duration::from_secs(55));
        assert_eq!(limiter.active_clients(), 2);

        limiter.sweep_expired_at(t0 + Duration::from_secs(70));
        assert_eq!(limiter.active_clients(), 1, "only the elapsed window is swept");
    }
}

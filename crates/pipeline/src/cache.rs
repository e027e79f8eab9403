//! Single-entry TTL cache for the last good payload.
//!
//! One entry per process; a successful fetch replaces it wholesale, so
//! concurrent readers always observe a complete payload/timestamp pair.

use std::sync::RwLock;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use common::types::CacheStatus;
use common::ObservationRecord;
use tracing::{debug, warn};

/// A cached payload with its write time.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub records: Vec<ObservationRecord>,
    /// Monotonic write time, used for TTL math.
    pub written_at: Instant,
    /// Wall-clock write time, used for response timestamps.
    pub written_at_utc: DateTime<Utc>,
}

impl CacheEntry {
    pub fn age(&self) -> Duration {
        self.written_at.elapsed()
    }
}

/// TTL cache holding the most recent successful result.
#[derive(Debug)]
pub struct TtlCache {
    entry: RwLock<Option<CacheEntry>>,
    ttl: Duration,
}

impl TtlCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entry: RwLock::new(None),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// True iff a payload is present and younger than the TTL.
    pub fn is_valid(&self) -> bool {
        self.entry
            .read()
            .expect("cache lock poisoned")
            .as_ref()
            .is_some_and(|e| e.age() < self.ttl)
    }

    /// The entry, only while valid.
    pub fn read(&self) -> Option<CacheEntry> {
        self.entry
            .read()
            .expect("cache lock poisoned")
            .as_ref()
            .filter(|e| e.age() < self.ttl)
            .cloned()
    }

    /// The entry regardless of age. Only the total-failure fallback path
    /// should reach for this.
    pub fn read_stale(&self) -> Option<CacheEntry> {
        self.entry.read().expect("cache lock poisoned").clone()
    }

    /// Replace the cached payload. An empty payload is rejected and the
    /// previous entry kept.
    pub fn write(&self, records: Vec<ObservationRecord>) {
        if records.is_empty() {
            warn!("Refusing to cache an empty payload");
            return;
        }

        let entry = CacheEntry {
            records,
            written_at: Instant::now(),
            written_at_utc: Utc::now(),
        };
        *self.entry.write().expect("cache lock poisoned") = Some(entry);
        debug!("Cache updated");
    }

    /// Administrative reset to the never-written state.
    pub fn clear(&self) {
        *self.entry.write().expect("cache lock poisoned") = None;
        debug!("Cache cleared");
    }

    pub fn status(&self) -> CacheStatus {
        let guard = self.entry.read().expect("cache lock poisoned");
        let age = guard.as_ref().map(|e| e.age());
        CacheStatus {
            has_data: guard.is_some(),
            age_seconds: age.map(|a| a.as_secs()),
            is_valid: age.is_some_and(|a| a < self.ttl),
        }
    }

    /// Pretend the current entry was written `age` ago.
    #[cfg(test)]
    pub(crate) fn backdate(&self, age: Duration) {
        if let Some(entry) = self.entry.write().expect("cache lock poisoned").as_mut() {
            entry.written_at = Instant::now() - age;
            entry.written_at_utc =
                Utc::now() - chrono::Duration::from_std(age).expect("test age fits chrono range");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::types::ObservationDetails;

    fn make_records(temp: &str) -> Vec<ObservationRecord> {
        vec![ObservationRecord {
            date: "Today".into(),
            time: "10:00".into(),
            weather: "Clear".into(),
            temperature: temp.into(),
            precipitation: "0%".into(),
            uv_index: "4".into(),
            wind_speed: "8 km/h".into(),
            details: ObservationDetails::default(),
        }]
    }

    #[test]
    fn test_read_within_ttl_returns_payload() {
        let cache = TtlCache::new(Duration::from_secs(600));
        cache.write(make_records("20 °"));

        assert!(cache.is_valid());
        let entry = cache.read().expect("fresh entry should be readable");
        assert_eq!(entry.records[0].temperature, "20 °");
    }

    #[test]
    fn test_read_after_ttl_returns_none_but_stale_read_survives() {
        let cache = TtlCache::new(Duration::from_secs(600));
        cache.write(make_records("20 °"));
        cache.backdate(Duration::from_secs(601));

        assert!(!cache.is_valid());
        assert!(cache.read().is_none(), "expired entry must not be served as valid");

        let stale = cache.read_stale().expect("stale read keeps the payload");
        assert_eq!(stale.records[0].temperature, "20 °");
    }

    #[test]
    fn test_empty_write_is_rejected() {
        let cache = TtlCache::new(Duration::from_secs(600));
        cache.write(make_records("20 °"));

        cache.write(Vec::new());

        let entry = cache.read().expect("previous payload must survive an empty write");
        assert_eq!(entry.records[0].temperature, "20 °");
    }

    #[test]
    fn test_write_replaces_wholesale() {
        let cache = TtlCache::new(Duration::from_secs(600));
        cache.write(make_records("20 °"));
        cache.write(make_records("25 °"));

        let entry = cache.read().expect("entry present");
        assert_eq!(entry.records.len(), 1, "payloads replace, never merge");
        assert_eq!(entry.records[0].temperature, "25 °");
    }

    #[test]
    fn test_clear_resets_to_never_written() {
        let cache = TtlCache::new(Duration::from_secs(600));
        cache.write(make_records("20 °"));
        cache.clear();

        assert!(!cache.is_valid());
        assert!(cache.read().is_none());
        assert!(cache.read_stale().is_none(), "clear drops even the stale payload");

        let status = cache.status();
        assert!(!status.has_data);
        assert!(status.age_seconds.is_none());
    }

    #[test]
    fn test_zero_ttl_never_valid() {
        let cache = TtlCache::new(Duration::ZERO);
        cache.write(make_records("20 °"));

        assert!(!cache.is_valid());
        assert!(cache.read().is_none());
        assert!(cache.read_stale().is_some());
    }

    #[test]
    fn test_status_reports_age() {
        let cache = TtlCache::new(Duration::from_secs(600));
        cache.write(make_records("20 °"));
        cache.backdate(Duration::from_secs(30));

        let status = cache.status();
        assert!(status.has_data);
        assert!(status.is_valid);
        assert!(status.age_seconds.expect("age present") >= 30);
    }
}

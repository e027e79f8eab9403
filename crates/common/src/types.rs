//! Domain types shared across the gateway.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Marker used for any display field a producer could not supply.
pub const PLACEHOLDER: &str = "--";

/// Current time as an RFC3339 string with millisecond precision.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Format a `DateTime<Utc>` the same way [`now_iso`] does.
pub fn to_iso(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

// ── Observation Types ─────────────────────────────────────────────────

/// Secondary metrics attached to an observation.
///
/// Values are display-ready text. Absent metrics are omitted from the
/// serialized form rather than carrying a placeholder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feels_like: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_cover: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_gust: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dew_point: Option<String>,
}

impl ObservationDetails {
    pub fn is_empty(&self) -> bool {
        self.feels_like.is_none()
            && self.humidity.is_none()
            && self.cloud_cover.is_none()
            && self.visibility.is_none()
            && self.pressure.is_none()
            && self.wind_gust.is_none()
            && self.dew_point.is_none()
    }
}

/// One normalized hourly observation, ready for the dashboard.
///
/// Every main field is always present; a producer gap becomes
/// [`PLACEHOLDER`] so consumers never branch on missing keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationRecord {
    /// Day label, e.g. "Today", "Tomorrow" or a "%m-%d" date.
    pub date: String,
    /// Hour label, e.g. "14:00".
    pub time: String,
    /// Free-text conditions description.
    pub weather: String,
    pub temperature: String,
    /// Precipitation chance.
    pub precipitation: String,
    pub uv_index: String,
    pub wind_speed: String,
    #[serde(default)]
    pub details: ObservationDetails,
}

/// A producer's output before normalization — every field optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precipitation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uv_index: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_speed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ObservationDetails>,
}

/// On-disk snapshot of the last good payload, as written by the binary
/// and read back by the snapshot-file producer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub data: Vec<RawRecord>,
}

// ── Response Envelopes ────────────────────────────────────────────────

/// The JSON envelope returned for every weather request.
///
/// Optional fields are omitted from serialization when unused so each
/// terminal state matches the dashboard contract exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<ObservationRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expired: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl WeatherResponse {
    /// Freshly produced data, straight from a source.
    pub fn fresh(data: Vec<ObservationRecord>, source: &str) -> Self {
        let count = data.len();
        Self {
            success: true,
            data: Some(data),
            cached: Some(false),
            expired: None,
            warning: None,
            error: None,
            message: None,
            retry_after: None,
            timestamp: Some(now_iso()),
            count: Some(count),
            source: Some(source.to_string()),
        }
    }

    /// Valid cache hit.
    pub fn cached(data: Vec<ObservationRecord>, written_at: DateTime<Utc>) -> Self {
        Self {
            success: true,
            data: Some(data),
            cached: Some(true),
            expired: None,
            warning: None,
            error: None,
            message: None,
            retry_after: None,
            timestamp: Some(to_iso(written_at)),
            count: None,
            source: Some("cache".to_string()),
        }
    }

    /// Stale cache served because every source failed.
    pub fn stale(data: Vec<ObservationRecord>, written_at: DateTime<Utc>, trigger: &str) -> Self {
        Self {
            success: true,
            data: Some(data),
            cached: Some(true),
            expired: Some(true),
            warning: Some("data may be out of date".to_string()),
            error: Some(trigger.to_string()),
            message: None,
            retry_after: None,
            timestamp: Some(to_iso(written_at)),
            count: None,
            source: Some("cache".to_string()),
        }
    }

    /// Request rejected by the rate limiter.
    pub fn rate_limited(retry_after_secs: u64) -> Self {
        Self {
            success: false,
            data: None,
            cached: None,
            expired: None,
            warning: None,
            error: None,
            message: Some("too many requests, please retry later".to_string()),
            retry_after: Some(retry_after_secs),
            timestamp: None,
            count: None,
            source: None,
        }
    }

    /// Total failure: no source produced data and nothing is cached.
    pub fn failure(message: &str) -> Self {
        Self {
            success: false,
            data: None,
            cached: None,
            expired: None,
            warning: None,
            error: None,
            message: Some(message.to_string()),
            retry_after: None,
            timestamp: Some(now_iso()),
            count: None,
            source: None,
        }
    }

    /// The HTTP status an edge layer should attach to this envelope.
    pub fn http_status(&self) -> u16 {
        if self.success {
            200
        } else if self.retry_after.is_some() {
            429
        } else {
            500
        }
    }
}

/// Acknowledgement for the administrative cache clear.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearResponse {
    pub success: bool,
    pub message: String,
    pub timestamp: String,
}

// ── Status Report ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UptimeStatus {
    pub seconds: u64,
    pub human: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatus {
    pub has_data: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_seconds: Option<u64>,
    pub is_valid: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimiterStatus {
    pub active_clients: usize,
    pub limit: u32,
    pub window_seconds: u64,
}

/// Operational snapshot of the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub success: bool,
    pub status: String,
    pub uptime: UptimeStatus,
    pub cache: CacheStatus,
    pub rate_limiting: RateLimiterStatus,
    pub timestamp: String,
}

/// Human-readable uptime, e.g. "2h 5m".
pub fn format_uptime(seconds: u64) -> String {
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let minutes = (seconds % 3_600) / 60;
    let secs = seconds % 60;

    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

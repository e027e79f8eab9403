//! Synthetic producer.
//!
//! Last link in the chain: fabricates a plausible hourly forecast so the
//! gateway can always answer in development or during a total outage.
//! Seeded, so two runs with the same seed produce identical payloads for
//! a given start hour.

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Timelike, Utc};
use common::types::ObservationDetails;
use common::{RawRecord, Result, PLACEHOLDER};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::Producer;

const CONDITIONS: &[&str] = &[
    "Clear",
    "Partly cloudy",
    "Mostly cloudy",
    "Overcast",
    "Light rain",
    "Showers",
];

/// Producer that deterministically fabricates observation rows.
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    seed: u64,
    hours: usize,
}

impl SyntheticSource {
    pub fn new(seed: u64, hours: usize) -> Self {
        Self { seed, hours }
    }
}

fn date_label(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        "Today".to_string()
    } else if date == today + Duration::days(1) {
        "Tomorrow".to_string()
    } else {
        format!("{:02}-{:02}", date.month(), date.day())
    }
}

/// Diurnal temperature curve: coolest around 06:00, warmest mid-afternoon.
fn base_temp(hour_of_day: u32) -> f64 {
    let phase = (hour_of_day as f64 - 6.0) / 24.0 * std::f64::consts::TAU;
    18.0 + 8.0 * phase.sin()
}

/// Generate `hours` hourly rows starting at `start`. Pure so tests can
/// pin the clock.
pub fn generate(start: DateTime<Utc>, seed: u64, hours: usize) -> Vec<RawRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    let today = start.date_naive();
    let mut rows = Vec::with_capacity(hours);

    for offset in 0..hours {
        let slot = start + Duration::hours(offset as i64);
        let hour = slot.hour();
        let temp = (base_temp(hour) + rng.gen_range(-2.0..2.0)).round() as i64;
        let daytime = (6..=18).contains(&hour);

        rows.push(RawRecord {
            date: Some(date_label(slot.date_naive(), today)),
            time: Some(format!("{:02}:00", hour)),
            weather: Some(CONDITIONS[rng.gen_range(0..CONDITIONS.len())].to_string()),
            temperature: Some(format!("{} °", temp)),
            precipitation: Some(format!("{}%", rng.gen_range(0..60))),
            uv_index: Some(if daytime {
                rng.gen_range(0..9).to_string()
            } else {
                PLACEHOLDER.to_string()
            }),
            wind_speed: Some(format!("{} km/h", rng.gen_range(3..18))),
            details: Some(ObservationDetails {
                feels_like: Some(format!("{} °", temp + rng.gen_range(-3..3))),
                humidity: Some(format!("{}%", rng.gen_range(40..80))),
                cloud_cover: Some(format!("{}%", rng.gen_range(0..100))),
                visibility: Some(format!("{} km", rng.gen_range(10..30))),
                pressure: Some(format!("{} hPa", rng.gen_range(1000..1050))),
                wind_gust: Some(format!("{} km/h", rng.gen_range(5..25))),
                dew_point: Some(format!("{} °", temp - rng.gen_range(5..15))),
            }),
        });
    }

    rows
}

#[async_trait]
impl Producer for SyntheticSource {
    fn name(&self) -> &str {
        "synthetic"
    }

    async fn produce(&self) -> Result<Vec<RawRecord>> {
        Ok(generate(Utc::now(), self.seed, self.hours))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_start() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-08-07T22:00:00Z")
            .expect("valid start")
            .with_timezone(&Utc)
    }

    #[test]
    fn test_generates_requested_horizon() {
        let rows = generate(fixed_start(), 7, 48);
        assert_eq!(rows.len(), 48);
    }

    #[test]
    fn test_same_seed_same_payload() {
        let a = generate(fixed_start(), 7, 24);
        let b = generate(fixed_start(), 7, 24);
        assert_eq!(a, b, "a fixed seed and start must reproduce the payload");

        let c = generate(fixed_start(), 8, 24);
        assert_ne!(a, c, "a different seed should perturb the payload");
    }

    #[test]
    fn test_rows_roll_over_day_labels() {
        let rows = generate(fixed_start(), 7, 30);

        assert_eq!(rows[0].date.as_deref(), Some("Today"));
        assert_eq!(rows[0].time.as_deref(), Some("22:00"));
        // Two hours later the UTC date flips.
        assert_eq!(rows[2].date.as_deref(), Some("Tomorrow"));
        assert_eq!(rows[2].time.as_deref(), Some("00:00"));
        assert_eq!(rows[26].date.as_deref(), Some("08-09"));
    }

    #[test]
    fn test_night_hours_have_no_uv_reading() {
        let rows = generate(fixed_start(), 7, 24);

        for row in &rows {
            let hour: u32 = row.time.as_deref().expect("time set")[..2].parse().expect("hour");
            let uv = row.uv_index.as_deref().expect("uv set");
            if !(6..=18).contains(&hour) {
                assert_eq!(uv, PLACEHOLDER, "night slot {} should have no UV", hour);
            } else {
                assert_ne!(uv, PLACEHOLDER, "day slot {} should have UV", hour);
            }
        }
    }

    #[test]
    fn test_every_row_is_fully_populated() {
        let rows = generate(fixed_start(), 7, 12);
        for row in &rows {
            assert!(row.temperature.is_some());
            assert!(row.weather.is_some());
            let details = row.details.as_ref().expect("details set");
            assert!(details.humidity.is_some());
            assert!(details.dew_point.is_some());
        }
    }
}

//! Raw record cleaning.
//!
//! Producers hand back whatever they could extract; normalization turns
//! that into the fixed dashboard shape: information-free rows dropped,
//! gaps replaced with the placeholder, horizon bounded.

use common::{Error, ObservationRecord, RawRecord, PLACEHOLDER};
use tracing::debug;

fn has_text(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|s| !s.trim().is_empty())
}

/// A row with none of time, temperature, or conditions carries nothing
/// the dashboard can render.
fn is_informative(raw: &RawRecord) -> bool {
    has_text(&raw.time) || has_text(&raw.temperature) || has_text(&raw.weather)
}

fn fill(field: Option<String>) -> String {
    match field {
        Some(s) if !s.trim().is_empty() => s,
        _ => PLACEHOLDER.to_string(),
    }
}

/// Normalize raw producer output into dashboard records.
///
/// Fails with [`Error::EmptyResult`] when nothing informative remains,
/// so an empty outcome is handled as a producer failure and never cached.
pub fn normalize(raw: Vec<RawRecord>, max_records: usize) -> Result<Vec<ObservationRecord>, Error> {
    let total = raw.len();

    let mut records: Vec<ObservationRecord> = raw
        .into_iter()
        .filter(is_informative)
        .map(|r| ObservationRecord {
            date: fill(r.date),
            time: fill(r.time),
            weather: fill(r.weather),
            temperature: fill(r.temperature),
            precipitation: fill(r.precipitation),
            uv_index: fill(r.uv_index),
            wind_speed: fill(r.wind_speed),
            details: r.details.unwrap_or_default(),
        })
        .collect();

    if records.is_empty() {
        return Err(Error::EmptyResult(format!(
            "no informative records left after filtering {} raw rows",
            total
        )));
    }

    if records.len() > max_records {
        debug!("Truncating {} records to horizon of {}", records.len(), max_records);
        records.truncate(max_records);
    }

    Ok(records)
}

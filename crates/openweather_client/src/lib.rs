//! OpenWeatherMap API client.
//!
//! Fetches current conditions and the forecast list from
//! `api.openweathermap.org` and converts them to display-ready raw
//! observation records for the acquisition pipeline.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use common::config::{LocationConfig, OpenWeatherConfig};
use common::{Error, ObservationDetails, RawRecord, PLACEHOLDER};
use serde::Deserialize;
use tracing::debug;

const BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
const FORECAST_SLOTS: usize = 48;

/// OpenWeatherMap client with connection pooling and a bounded timeout.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: reqwest::Client,
    api_key: String,
    units: String,
    lang: String,
}

// ── OpenWeatherMap response types ─────────────────────────────────────

/// Response from `/weather` (current conditions).
#[derive(Debug, Deserialize)]
pub struct CurrentWeatherResponse {
    #[serde(default)]
    pub weather: Vec<ConditionSummary>,
    pub main: ThermalReadings,
    #[serde(default)]
    pub clouds: Option<CloudCover>,
    #[serde(default)]
    pub wind: Option<WindReadings>,
    #[serde(default)]
    pub visibility: Option<i64>,
    #[serde(default)]
    pub rain: Option<RainVolume>,
    #[serde(default)]
    pub uvi: Option<f64>,
    pub dt: i64,
}

/// Response from `/forecast` (rolling slot list).
#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub list: Vec<ForecastSlot>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastSlot {
    pub dt: i64,
    pub main: ThermalReadings,
    #[serde(default)]
    pub weather: Vec<ConditionSummary>,
    #[serde(default)]
    pub clouds: Option<CloudCover>,
    #[serde(default)]
    pub wind: Option<WindReadings>,
    #[serde(default)]
    pub visibility: Option<i64>,
    /// Probability of precipitation, 0.0 - 1.0.
    #[serde(default)]
    pub pop: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct ConditionSummary {
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct ThermalReadings {
    pub temp: f64,
    #[serde(default)]
    pub feels_like: Option<f64>,
    #[serde(default)]
    pub humidity: Option<i64>,
    #[serde(default)]
    pub pressure: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CloudCover {
    #[serde(default)]
    pub all: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct WindReadings {
    #[serde(default)]
    pub speed: Option<f64>,
    #[serde(default)]
    pub gust: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct RainVolume {
    #[serde(rename = "1h", default)]
    pub one_hour: Option<f64>,
}

// ── Implementation ────────────────────────────────────────────────────

impl OpenWeatherClient {
    pub fn new(cfg: &OpenWeatherConfig) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .user_agent("weather-gateway/0.1 (forecast dashboard)")
            .pool_max_idle_per_host(4)
            .timeout(std::time::Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|e| Error::OpenWeather(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: cfg.api_key.clone(),
            units: cfg.units.clone(),
            lang: cfg.lang.clone(),
        })
    }

    /// Fetch current conditions for a location.
    pub async fn fetch_current(
        &self,
        location: &LocationConfig,
    ) -> Result<CurrentWeatherResponse, Error> {
        let url = format!("{}/weather", BASE_URL);
        debug!("Fetching OpenWeatherMap current conditions for {}", location.name);

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("lat", location.lat.to_string()),
                ("lon", location.lon.to_string()),
                ("appid", self.api_key.clone()),
                ("units", self.units.clone()),
                ("lang", self.lang.clone()),
            ])
            .send()
            .await
            .map_err(|e| Error::OpenWeather(format!("HTTP error for {}: {}", location.name, e)))?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::OpenWeather(format!(
                "API returned {} for {}: {}",
                status,
                location.name,
                &body[..body.len().min(500)]
            )));
        }

        resp.json().await.map_err(|e| {
            Error::OpenWeather(format!("JSON parse error for {}: {}", location.name, e))
        })
    }

    /// Fetch the forecast slot list for a location.
    pub async fn fetch_forecast(
        &self,
        location: &LocationConfig,
    ) -> Result<ForecastResponse, Error> {
        let url = format!("{}/forecast", BASE_URL);
        debug!("Fetching OpenWeatherMap forecast for {}", location.name);

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("lat", location.lat.to_string()),
                ("lon", location.lon.to_string()),
                ("appid", self.api_key.clone()),
                ("units", self.units.clone()),
                ("lang", self.lang.clone()),
                ("cnt", FORECAST_SLOTS.to_string()),
            ])
            .send()
            .await
            .map_err(|e| Error::OpenWeather(format!("HTTP error for {}: {}", location.name, e)))?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::OpenWeather(format!(
                "Forecast API returned {} for {}: {}",
                status,
                location.name,
                &body[..body.len().min(500)]
            )));
        }

        resp.json().await.map_err(|e| {
            Error::OpenWeather(format!("JSON parse error for {}: {}", location.name, e))
        })
    }

    /// Fetch current + forecast and flatten into raw observation records.
    pub async fn get_observations(
        &self,
        location: &LocationConfig,
    ) -> Result<Vec<RawRecord>, Error> {
        let current = self.fetch_current(location).await?;
        let forecast = self.fetch_forecast(location).await?;

        let records = transform_observations(Utc::now(), &current, &forecast);
        if records.is_empty() {
            return Err(Error::OpenWeather(format!(
                "No observation rows for {}",
                location.name
            )));
        }

        debug!("Got {} OpenWeatherMap rows for {}", records.len(), location.name);
        Ok(records)
    }
}

// ── Transform helpers ─────────────────────────────────────────────────

fn date_label(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        "Today".to_string()
    } else if date == today + Duration::days(1) {
        "Tomorrow".to_string()
    } else {
        format!("{:02}-{:02}", date.month(), date.day())
    }
}

fn labels_for(dt: i64, today: NaiveDate) -> (String, String) {
    match DateTime::<Utc>::from_timestamp(dt, 0) {
        Some(ts) => (
            date_label(ts.date_naive(), today),
            ts.format("%H:%M").to_string(),
        ),
        None => (PLACEHOLDER.to_string(), PLACEHOLDER.to_string()),
    }
}

fn fmt_temp(t: f64) -> String {
    format!("{} °", t.round() as i64)
}

fn fmt_kmh(meters_per_sec: f64) -> String {
    format!("{} km/h", (meters_per_sec * 3.6).round() as i64)
}

fn description_of(conditions: &[ConditionSummary]) -> Option<String> {
    conditions
        .first()
        .map(|c| c.description.trim())
        .filter(|d| !d.is_empty())
        .map(str::to_string)
}

fn details_from(
    main: &ThermalReadings,
    clouds: Option<&CloudCover>,
    wind: Option<&WindReadings>,
    visibility: Option<i64>,
) -> ObservationDetails {
    ObservationDetails {
        feels_like: main.feels_like.map(fmt_temp),
        humidity: main.humidity.map(|h| format!("{}%", h)),
        cloud_cover: clouds.and_then(|c| c.all).map(|c| format!("{}%", c)),
        visibility: visibility.map(|v| format!("{} km", ((v as f64) / 1000.0).round() as i64)),
        pressure: main.pressure.map(|p| format!("{} hPa", p)),
        wind_gust: wind.and_then(|w| w.gust).map(fmt_kmh),
        dew_point: None,
    }
}

/// Flatten current conditions plus forecast slots into raw records,
/// oldest first. Pure so tests can pin `now`.
pub fn transform_observations(
    now: DateTime<Utc>,
    current: &CurrentWeatherResponse,
    forecast: &ForecastResponse,
) -> Vec<RawRecord> {
    let today = now.date_naive();
    let mut records = Vec::with_capacity(forecast.list.len() + 1);

    // Current conditions lead the sequence.
    let (date, time) = labels_for(current.dt, today);
    records.push(RawRecord {
        date: Some(date),
        time: Some(time),
        weather: description_of(&current.weather),
        temperature: Some(fmt_temp(current.main.temp)),
        precipitation: Some(match &current.rain {
            Some(rain) => format!(
                "{}%",
                (rain.one_hour.unwrap_or(0.0) * 100.0).round() as i64
            ),
            None => "0%".to_string(),
        }),
        uv_index: current.uvi.map(|u| format!("{}", u.round() as i64)),
        wind_speed: current.wind.as_ref().and_then(|w| w.speed).map(fmt_kmh),
        details: Some(details_from(
            &current.main,
            current.clouds.as_ref(),
            current.wind.as_ref(),
            current.visibility,
        )),
    });

    for slot in &forecast.list {
        let (date, time) = labels_for(slot.dt, today);
        records.push(RawRecord {
            date: Some(date),
            time: Some(time),
            weather: description_of(&slot.weather),
            temperature: Some(fmt_temp(slot.main.temp)),
            precipitation: Some(format!(
                "{}%",
                (slot.pop.unwrap_or(0.0) * 100.0).round() as i64
            )),
            // The slot list carries no UV data.
            uv_index: None,
            wind_speed: slot.wind.as_ref().and_then(|w| w.speed).map(fmt_kmh),
            details: Some(details_from(
                &slot.main,
                slot.clouds.as_ref(),
                slot.wind.as_ref(),
                slot.visibility,
            )),
        });
    }

    records.truncate(FORECAST_SLOTS);
    records
}

//! Open-Meteo forecast client.
//!
//! Fetches current conditions and a 3-day forecast for the fixed monitored
//! location, with bounded retry and a single-slot concurrency gate: at most
//! one HTTP request is in flight at any instant, and concurrent callers wait
//! for the slot instead of issuing parallel requests.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, PrimitiveDateTime};

use wxmon_types::{CurrentConditions, DailyForecast, MAX_FORECAST_DAYS, WeatherSnapshot};

use crate::error::{Error, Result};
use crate::retry::{RetryConfig, with_retry};
use crate::source::WeatherSource;

/// Latitude of the monitored location (Chuhuiv).
pub const LOCATION_LATITUDE: f64 = 49.836626;
/// Longitude of the monitored location.
pub const LOCATION_LONGITUDE: f64 = 36.689939;
/// IANA timezone the upstream reports local times in.
pub const LOCATION_TIMEZONE: &str = "Europe/Kyiv";
/// Display name carried by every snapshot.
pub const LOCATION_NAME: &str = "Chuhuiv, Kharkiv Oblast";

const DEFAULT_BASE_URL: &str = "https://api.open-meteo.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = concat!("wxmon/", env!("CARGO_PKG_VERSION"));

const CURRENT_FIELDS: &[&str] = &[
    "temperature_2m",
    "apparent_temperature",
    "relative_humidity_2m",
    "weather_code",
    "cloud_cover",
    "pressure_msl",
    "wind_speed_10m",
    "wind_direction_10m",
    "wind_gusts_10m",
];

const DAILY_FIELDS: &[&str] = &[
    "weather_code",
    "temperature_2m_max",
    "temperature_2m_min",
    "precipitation_sum",
    "wind_gusts_10m_max",
];

// Open-Meteo reports local times at minute precision ("2026-08-23T14:30").
const OBSERVATION_TIME_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]");
const OBSERVATION_TIME_SECONDS_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
const FORECAST_DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// HTTP client for the Open-Meteo forecast API.
#[derive(Debug)]
pub struct OpenMeteoClient {
    client: reqwest::Client,
    base_url: String,
    /// One-permit gate serializing outbound requests.
    gate: Semaphore,
    retry: RetryConfig,
}

impl OpenMeteoClient {
    /// Create a client against the production endpoint.
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client against a custom base URL.
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .gzip(true)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            gate: Semaphore::new(1),
            retry: RetryConfig::default(),
        })
    }

    /// Override the retry policy.
    #[must_use]
    pub fn retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Build the forecast request URL for the fixed location.
    fn forecast_url(&self) -> String {
        format!(
            "{}/v1/forecast?latitude={}&longitude={}&timezone={}&forecast_days={}&current={}&daily={}",
            self.base_url,
            LOCATION_LATITUDE,
            LOCATION_LONGITUDE,
            LOCATION_TIMEZONE,
            MAX_FORECAST_DAYS,
            CURRENT_FIELDS.join(","),
            DAILY_FIELDS.join(",")
        )
    }

    /// Perform a single HTTP attempt and parse the response body.
    async fn attempt(&self, url: &str, cancel: &CancellationToken) -> Result<WeatherSnapshot> {
        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            result = self.client.get(url).send() => result?,
        };

        let status = response.status();
        if !status.is_success() {
            return Err(Error::status(status));
        }

        let body = tokio::select! {
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            result = response.text() => result?,
        };

        parse_forecast(&body)
    }
}

#[async_trait]
impl WeatherSource for OpenMeteoClient {
    async fn fetch(&self, cancel: &CancellationToken) -> Result<WeatherSnapshot> {
        let _permit = tokio::select! {
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            permit = self.gate.acquire() => permit.map_err(|_| Error::Cancelled)?,
        };

        let url = self.forecast_url();
        debug!("fetching forecast from {}", url);

        with_retry(&self.retry, "fetch_forecast", cancel, || {
            self.attempt(&url, cancel)
        })
        .await
    }
}

// ==========================================================================
// Response payload
// ==========================================================================

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: Option<CurrentPayload>,
    daily: Option<DailyPayload>,
}

/// The `current` section. Every field is required; a missing one is a
/// parse failure, not a silent default.
#[derive(Debug, Deserialize)]
struct CurrentPayload {
    time: String,
    temperature_2m: f64,
    apparent_temperature: f64,
    relative_humidity_2m: u8,
    weather_code: u16,
    cloud_cover: u8,
    pressure_msl: f64,
    wind_speed_10m: f64,
    wind_direction_10m: u16,
    wind_gusts_10m: f64,
}

/// The `daily` section: parallel arrays indexed positionally.
#[derive(Debug, Deserialize)]
struct DailyPayload {
    time: Vec<String>,
    weather_code: Vec<u16>,
    temperature_2m_max: Vec<f64>,
    temperature_2m_min: Vec<f64>,
    precipitation_sum: Vec<f64>,
    wind_gusts_10m_max: Vec<f64>,
}

/// Parse a forecast response body into the domain model.
pub fn parse_forecast(body: &str) -> Result<WeatherSnapshot> {
    let response: ForecastResponse = serde_json::from_str(body)
        .map_err(|e| Error::parse(format!("malformed forecast response: {e}")))?;

    let current = response.current.map(convert_current).transpose()?;
    let daily = response
        .daily
        .map(convert_daily)
        .transpose()?
        .unwrap_or_default();

    Ok(WeatherSnapshot {
        location_name: LOCATION_NAME.to_string(),
        current,
        daily,
    })
}

fn convert_current(payload: CurrentPayload) -> Result<CurrentConditions> {
    Ok(CurrentConditions {
        observed_at: parse_observation_time(&payload.time)?,
        temperature_c: payload.temperature_2m,
        apparent_temperature_c: payload.apparent_temperature,
        relative_humidity_pct: payload.relative_humidity_2m,
        weather_code: payload.weather_code,
        cloud_cover_pct: payload.cloud_cover,
        pressure_msl_hpa: payload.pressure_msl,
        wind_speed_kmh: payload.wind_speed_10m,
        wind_direction_deg: payload.wind_direction_10m,
        wind_gust_kmh: payload.wind_gusts_10m,
    })
}

fn convert_daily(payload: DailyPayload) -> Result<Vec<DailyForecast>> {
    let count = payload.time.len().min(MAX_FORECAST_DAYS);
    let mut days = Vec::with_capacity(count);

    for i in 0..count {
        let date = Date::parse(&payload.time[i], FORECAST_DATE_FORMAT)
            .map_err(|e| Error::parse(format!("invalid forecast date '{}': {e}", payload.time[i])))?;

        days.push(DailyForecast {
            date,
            weather_code: daily_value(&payload.weather_code, i, "weather_code")?,
            temperature_min_c: daily_value(&payload.temperature_2m_min, i, "temperature_2m_min")?,
            temperature_max_c: daily_value(&payload.temperature_2m_max, i, "temperature_2m_max")?,
            precipitation_sum_mm: daily_value(&payload.precipitation_sum, i, "precipitation_sum")?,
            wind_gust_max_kmh: daily_value(&payload.wind_gusts_10m_max, i, "wind_gusts_10m_max")?,
        });
    }

    Ok(days)
}

/// Index into a parallel array, treating a short array as a parse failure.
fn daily_value<T: Copy>(values: &[T], index: usize, field: &str) -> Result<T> {
    values
        .get(index)
        .copied()
        .ok_or_else(|| Error::parse(format!("daily array `{field}` shorter than `time`")))
}

fn parse_observation_time(raw: &str) -> Result<PrimitiveDateTime> {
    PrimitiveDateTime::parse(raw, OBSERVATION_TIME_FORMAT)
        .or_else(|_| PrimitiveDateTime::parse(raw, OBSERVATION_TIME_SECONDS_FORMAT))
        .map_err(|e| Error::parse(format!("invalid observation time '{raw}': {e}")))
}

//! Core value types for weather snapshots and the cache envelope.

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime, PrimitiveDateTime};

/// Maximum number of forecast days carried by a snapshot.
pub const MAX_FORECAST_DAYS: usize = 3;

/// Current weather conditions at the monitored location.
///
/// All fields are immutable once constructed; a new observation produces
/// a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    /// Local observation time as reported upstream (no UTC offset).
    pub observed_at: PrimitiveDateTime,
    /// Air temperature in degrees Celsius.
    pub temperature_c: f64,
    /// Apparent ("feels like") temperature in degrees Celsius.
    pub apparent_temperature_c: f64,
    /// Relative humidity percentage (0-100).
    pub relative_humidity_pct: u8,
    /// WMO weather code. Consumed opaquely; interpretation belongs to the
    /// presentation layer.
    pub weather_code: u16,
    /// Cloud cover percentage (0-100).
    pub cloud_cover_pct: u8,
    /// Pressure at mean sea level in hPa.
    pub pressure_msl_hpa: f64,
    /// Wind speed in km/h.
    pub wind_speed_kmh: f64,
    /// Wind direction in degrees (0-359).
    pub wind_direction_deg: u16,
    /// Wind gusts in km/h.
    pub wind_gust_kmh: f64,
}

/// Weather forecast for a single calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    /// Date of the forecast (local calendar date, no time component).
    pub date: Date,
    /// WMO weather code for the day.
    pub weather_code: u16,
    /// Minimum temperature in degrees Celsius.
    pub temperature_min_c: f64,
    /// Maximum temperature in degrees Celsius.
    pub temperature_max_c: f64,
    /// Total precipitation in millimeters.
    pub precipitation_sum_mm: f64,
    /// Maximum wind gusts in km/h.
    pub wind_gust_max_kmh: f64,
}

/// One complete current-plus-forecast reading for the monitored location.
///
/// Produced by a successful fetch, or reconstructed verbatim from the
/// on-disk cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// Display name of the location. Never empty.
    pub location_name: String,
    /// Current conditions, absent when upstream omitted them.
    pub current: Option<CurrentConditions>,
    /// Up to [`MAX_FORECAST_DAYS`] entries, earliest day first.
    pub daily: Vec<DailyForecast>,
}

/// Cache envelope wrapping a snapshot with its expiry window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedRecord {
    /// The cached snapshot.
    pub data: Option<WeatherSnapshot>,
    /// When the record was written (UTC).
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// When the record stops being valid (UTC).
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

impl CachedRecord {
    /// Whether the record is still valid at `now`.
    pub fn is_valid(&self, now: OffsetDateTime) -> bool {
        now < self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;
    use time::macros::{date, datetime};

    fn sample_snapshot() -> WeatherSnapshot {
        WeatherSnapshot {
            location_name: "Chuhuiv, Kharkiv Oblast".to_string(),
            current: Some(CurrentConditions {
                observed_at: datetime!(2026-08-23 14:30),
                temperature_c: 27.4,
                apparent_temperature_c: 26.1,
                relative_humidity_pct: 38,
                weather_code: 1,
                cloud_cover_pct: 20,
                pressure_msl_hpa: 1014.2,
                wind_speed_kmh: 12.6,
                wind_direction_deg: 245,
                wind_gust_kmh: 28.1,
            }),
            daily: vec![
                DailyForecast {
                    date: date!(2026 - 08 - 23),
                    weather_code: 1,
                    temperature_min_c: 15.3,
                    temperature_max_c: 28.0,
                    precipitation_sum_mm: 0.0,
                    wind_gust_max_kmh: 33.5,
                },
                DailyForecast {
                    date: date!(2026 - 08 - 24),
                    weather_code: 61,
                    temperature_min_c: 14.1,
                    temperature_max_c: 22.7,
                    precipitation_sum_mm: 4.3,
                    wind_gust_max_kmh: 41.0,
                },
            ],
        }
    }

    #[test]
    fn snapshot_serde_round_trip() {
        let snapshot = sample_snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let restored: WeatherSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, snapshot);
    }

    #[test]
    fn snapshot_without_current_round_trips() {
        let snapshot = WeatherSnapshot {
            current: None,
            ..sample_snapshot()
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        let restored: WeatherSnapshot = serde_json::from_str(&json).unwrap();
        assert!(restored.current.is_none());
        assert_eq!(restored, snapshot);
    }

    #[test]
    fn cached_record_round_trip_uses_rfc3339_timestamps() {
        let now = datetime!(2026-08-23 12:00 UTC);
        let record = CachedRecord {
            data: Some(sample_snapshot()),
            timestamp: now,
            expires_at: now + Duration::minutes(30),
        };

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("2026-08-23T12:00:00Z"));

        let restored: CachedRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, record);
    }

    #[test]
    fn cached_record_validity_window() {
        let written = datetime!(2026-08-23 12:00 UTC);
        let record = CachedRecord {
            data: None,
            timestamp: written,
            expires_at: written + Duration::minutes(30),
        };

        assert!(record.is_valid(written));
        assert!(record.is_valid(written + Duration::minutes(29)));
        // Expiry instant itself is no longer valid.
        assert!(!record.is_valid(written + Duration::minutes(30)));
        assert!(!record.is_valid(written + Duration::hours(1)));
    }

    #[test]
    fn forecast_entries_preserve_order() {
        let snapshot = sample_snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let restored: WeatherSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.daily[0].date, date!(2026 - 08 - 23));
        assert_eq!(restored.daily[1].date, date!(2026 - 08 - 24));
    }
}

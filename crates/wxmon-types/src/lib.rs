//! Weather data model for wxmon.
//!
//! This crate provides the immutable value types describing a weather
//! snapshot (current conditions plus a short daily forecast) and the
//! envelope used to persist one snapshot on disk with an expiry window.
//!
//! # Example
//!
//! ```
//! use wxmon_types::{DailyForecast, WeatherSnapshot};
//! use time::macros::date;
//!
//! let snapshot = WeatherSnapshot {
//!     location_name: "Chuhuiv, Kharkiv Oblast".to_string(),
//!     current: None,
//!     daily: vec![DailyForecast {
//!         date: date!(2026 - 08 - 23),
//!         weather_code: 3,
//!         temperature_min_c: 14.2,
//!         temperature_max_c: 24.8,
//!         precipitation_sum_mm: 0.0,
//!         wind_gust_max_kmh: 31.0,
//!     }],
//! };
//! assert_eq!(snapshot.daily.len(), 1);
//! ```

pub mod models;

pub use models::{
    CachedRecord, CurrentConditions, DailyForecast, MAX_FORECAST_DAYS, WeatherSnapshot,
};

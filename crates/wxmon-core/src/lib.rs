//! Weather acquisition pipeline for the wxmon monitor.
//!
//! This crate fetches current conditions and a short forecast from the
//! Open-Meteo API for a fixed monitored location. Requests are serialized
//! through a single-slot gate, protected by bounded exponential-backoff
//! retry, and cancellable at every await point.
//!
//! # Example
//!
//! ```no_run
//! use tokio_util::sync::CancellationToken;
//! use wxmon_core::{OpenMeteoClient, WeatherSource};
//!
//! # async fn example() -> Result<(), wxmon_core::Error> {
//! let client = OpenMeteoClient::new()?;
//! let cancel = CancellationToken::new();
//!
//! let snapshot = client.fetch(&cancel).await?;
//! if let Some(current) = &snapshot.current {
//!     println!("{}: {:.1} C", snapshot.location_name, current.temperature_c);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod retry;
pub mod source;

pub use client::{
    LOCATION_LATITUDE, LOCATION_LONGITUDE, LOCATION_NAME, LOCATION_TIMEZONE, OpenMeteoClient,
    parse_forecast,
};
pub use error::{Error, Result};
pub use retry::{RetryConfig, with_retry};
pub use source::WeatherSource;

//! Abstraction over weather data sources.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use wxmon_types::WeatherSnapshot;

use crate::error::Result;

/// A source of weather snapshots for the monitored location.
///
/// The refresh orchestrator consumes this seam; [`crate::OpenMeteoClient`]
/// is the production implementation, and tests substitute scripted doubles.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Fetch a fresh snapshot.
    ///
    /// Implementations must observe `cancel` at every suspension point and
    /// return [`crate::Error::Cancelled`] promptly once it fires.
    async fn fetch(&self, cancel: &CancellationToken) -> Result<WeatherSnapshot>;
}

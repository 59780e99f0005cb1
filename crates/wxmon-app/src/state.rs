//! Observable view state published by the refresh orchestrator.

use time::OffsetDateTime;
use wxmon_types::WeatherSnapshot;

/// Coarse lifecycle phase derived from the view state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Showing data (or nothing), no refresh running.
    Idle,
    /// A refresh cycle is in flight.
    Refreshing,
    /// The last refresh failed; `error` carries the message.
    Error,
}

/// Everything a consumer needs to render the monitor.
///
/// Published through a `tokio::sync::watch` channel: the orchestrator is the
/// single writer, any number of consumers observe the latest value.
#[derive(Debug, Clone)]
pub struct ViewState {
    /// Most recent snapshot, from cache or a live fetch.
    pub snapshot: Option<WeatherSnapshot>,
    /// User-facing message from the last failed refresh.
    pub error: Option<String>,
    /// Whether a refresh cycle is currently running.
    pub busy: bool,
    /// When `snapshot` was produced.
    pub last_updated: Option<OffsetDateTime>,
    /// Whether the automatic refresh timer is enabled.
    pub auto_refresh: bool,
}

impl ViewState {
    /// Initial state before any data arrives.
    pub fn new(auto_refresh: bool) -> Self {
        Self {
            snapshot: None,
            error: None,
            busy: false,
            last_updated: None,
            auto_refresh,
        }
    }

    /// Derive the lifecycle phase. A running refresh takes precedence over a
    /// stale error message.
    pub fn phase(&self) -> Phase {
        if self.busy {
            Phase::Refreshing
        } else if self.error.is_some() {
            Phase::Error
        } else {
            Phase::Idle
        }
    }
}

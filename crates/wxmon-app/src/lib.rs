//! Weather monitor application library.
//!
//! Wires the fetch pipeline ([`wxmon_core`]) and the snapshot cache
//! ([`wxmon_store`]) into a refresh orchestrator that consumers observe
//! through a watch channel.

pub mod config;
pub mod refresh;
pub mod state;

pub use config::{Config, ConfigError};
pub use refresh::Refresher;
pub use state::{Phase, ViewState};

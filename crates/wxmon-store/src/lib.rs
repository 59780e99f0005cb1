//! Local persistence for weather snapshots.
//!
//! This crate caches the most recent weather snapshot as a single JSON file
//! so the monitor can show data immediately on startup while a fresh fetch
//! runs in the background.
//!
//! # Behavior
//!
//! - Each save overwrites the previous record with a new expiry stamp
//! - Loads return only records that have not outlived the cache lifetime
//! - Expired records are deleted as they are discovered
//! - Cache failures are logged and swallowed, they never interrupt a refresh
//!
//! # Example
//!
//! ```no_run
//! use wxmon_store::CacheStore;
//!
//! let store = CacheStore::open_default();
//! if let Some(snapshot) = store.load() {
//!     println!("cached: {}", snapshot.location_name);
//! }
//! ```

mod error;
mod store;

pub use error::{Error, Result};
pub use store::{CacheStore, DEFAULT_CACHE_LIFETIME};

/// Default cache file path following platform conventions.
///
/// - Linux: `~/.local/share/wxmon/cache.json`
/// - macOS: `~/Library/Application Support/wxmon/cache.json`
/// - Windows: `C:\Users\<user>\AppData\Local\wxmon\cache.json`
pub fn default_cache_path() -> std::path::PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("wxmon")
        .join("cache.json")
}

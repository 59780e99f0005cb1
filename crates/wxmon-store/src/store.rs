//! Cache store implementation.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use time::OffsetDateTime;
use tracing::{debug, warn};

use wxmon_types::{CachedRecord, WeatherSnapshot};

use crate::error::{Error, Result};

/// How long a saved snapshot stays valid.
pub const DEFAULT_CACHE_LIFETIME: Duration = Duration::from_secs(30 * 60);

/// JSON-file cache for the most recent weather snapshot.
///
/// The public `save`/`load`/`clear` operations never fail: the cache is an
/// optimization, and any filesystem or serialization problem is logged as a
/// warning and otherwise ignored.
pub struct CacheStore {
    path: PathBuf,
    lifetime: Duration,
}

impl CacheStore {
    /// Create a store backed by the given file path.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lifetime: DEFAULT_CACHE_LIFETIME,
        }
    }

    /// Create a store at the default platform location.
    pub fn open_default() -> Self {
        Self::open(crate::default_cache_path())
    }

    /// Override the cache lifetime.
    #[must_use]
    pub fn lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = lifetime;
        self
    }

    /// Path of the backing cache file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist a snapshot, replacing any previous record.
    pub fn save(&self, snapshot: &WeatherSnapshot) {
        if let Err(e) = self.try_save(snapshot) {
            warn!("failed to save weather cache: {e}");
        }
    }

    /// Load the cached snapshot if one exists and is still valid.
    ///
    /// An expired record is deleted on sight. A missing, unreadable, or
    /// corrupt cache file is treated as a miss.
    pub fn load(&self) -> Option<WeatherSnapshot> {
        let record = match self.try_load() {
            Ok(record) => record?,
            Err(e) => {
                warn!("failed to load weather cache: {e}");
                return None;
            }
        };

        if !record.is_valid(OffsetDateTime::now_utc()) {
            debug!("cached snapshot expired at {}, discarding", record.expires_at);
            self.clear();
            return None;
        }

        record.data
    }

    /// Load the raw cached record without validity filtering.
    pub fn info(&self) -> Option<CachedRecord> {
        match self.try_load() {
            Ok(record) => record,
            Err(e) => {
                warn!("failed to read weather cache: {e}");
                None
            }
        }
    }

    /// Delete the cache file if it exists.
    pub fn clear(&self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!("removed cache file {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("failed to remove weather cache: {e}"),
        }
    }

    fn try_save(&self, snapshot: &WeatherSnapshot) -> Result<()> {
        let now = OffsetDateTime::now_utc();
        let record = CachedRecord {
            data: Some(snapshot.clone()),
            timestamp: now,
            expires_at: now + self.lifetime,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| Error::CreateDirectory {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        // Write to a sibling temp file first so readers never see a
        // half-written record.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(&record)?)?;
        fs::rename(&tmp, &self.path)?;

        debug!("saved weather cache, valid until {}", record.expires_at);
        Ok(())
    }

    fn try_load(&self) -> Result<Option<CachedRecord>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        Ok(Some(serde_json::from_str(&contents)?))
    }
}

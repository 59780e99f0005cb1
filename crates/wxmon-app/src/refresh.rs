//! Refresh orchestration.
//!
//! The [`Refresher`] owns the refresh lifecycle: it seeds the view state from
//! the on-disk cache at startup, runs fetch cycles against a
//! [`WeatherSource`], publishes every transition through a watch channel, and
//! drives an optional periodic refresh timer.
//!
//! Cycles are generation-tagged. Starting a new cycle cancels the previous
//! one and bumps the generation; a cycle whose generation is no longer
//! current discards its result instead of publishing, so a slow stale fetch
//! can never overwrite fresher data.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use time::OffsetDateTime;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use wxmon_core::{Error as FetchError, WeatherSource};
use wxmon_store::CacheStore;

use crate::state::ViewState;

/// Drives cache-seeded startup, manual and scheduled refresh cycles, and
/// publishes [`ViewState`] transitions.
pub struct Refresher {
    shared: Arc<Shared>,
    interval: Duration,
    timer: Mutex<Option<CancellationToken>>,
}

/// State reachable from spawned cycle and timer tasks.
struct Shared {
    source: Arc<dyn WeatherSource>,
    store: Arc<CacheStore>,
    state: watch::Sender<ViewState>,
    /// Generation of the most recently started cycle.
    generation: AtomicU64,
    /// Cancellation token of the in-flight cycle, if any.
    cycle: Mutex<Option<CancellationToken>>,
}

impl Refresher {
    /// Create an orchestrator. No work starts until [`Refresher::start`].
    pub fn new(
        source: Arc<dyn WeatherSource>,
        store: CacheStore,
        interval: Duration,
        auto_refresh: bool,
    ) -> Self {
        let (state, _) = watch::channel(ViewState::new(auto_refresh));
        Self {
            shared: Arc::new(Shared {
                source,
                store: Arc::new(store),
                state,
                generation: AtomicU64::new(0),
                cycle: Mutex::new(None),
            }),
            interval,
            timer: Mutex::new(None),
        }
    }

    /// Subscribe to view state updates.
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.shared.state.subscribe()
    }

    /// Begin operation: publish any valid cached snapshot immediately, kick
    /// off a fetch cycle, and arm the refresh timer if enabled.
    pub fn start(&self) {
        let cached_at = self.shared.store.info().map(|record| record.timestamp);
        if let Some(snapshot) = self.shared.store.load() {
            info!("showing cached snapshot while refreshing");
            self.shared.state.send_modify(|s| {
                s.snapshot = Some(snapshot);
                s.last_updated = cached_at;
            });
        }

        Arc::clone(&self.shared).start_cycle();

        if self.shared.state.borrow().auto_refresh {
            self.arm_timer();
        }
    }

    /// Request a manual refresh.
    ///
    /// Returns `false` without starting anything if a cycle is already in
    /// flight.
    pub fn trigger(&self) -> bool {
        if self.shared.state.borrow().busy {
            debug!("manual refresh ignored, a cycle is already running");
            return false;
        }
        Arc::clone(&self.shared).start_cycle();
        true
    }

    /// Enable or disable the periodic refresh timer.
    ///
    /// Enabling does not start an immediate cycle; the first scheduled
    /// refresh happens one full interval later.
    pub fn set_auto_refresh(&self, enabled: bool) {
        self.shared.state.send_if_modified(|s| {
            if s.auto_refresh == enabled {
                return false;
            }
            s.auto_refresh = enabled;
            true
        });

        if enabled {
            self.arm_timer();
        } else {
            self.stop_timer();
        }
    }

    /// Stop the timer and cancel any in-flight cycle. Idempotent.
    pub fn shutdown(&self) {
        self.stop_timer();
        self.shared.cancel_inflight();
    }

    fn arm_timer(&self) {
        let mut guard = self.timer.lock().unwrap();
        if guard.is_some() {
            return;
        }

        let token = CancellationToken::new();
        let task_token = token.clone();
        let shared = Arc::clone(&self.shared);
        let interval = self.interval;

        tokio::spawn(async move {
            // First tick lands one full interval from now.
            let mut ticker = interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = task_token.cancelled() => return,
                    _ = ticker.tick() => {}
                }

                let skip = {
                    let state = shared.state.borrow();
                    state.busy || !state.auto_refresh
                };
                if skip {
                    debug!("scheduled refresh skipped");
                    continue;
                }

                debug!("scheduled refresh firing");
                Arc::clone(&shared).start_cycle();
            }
        });

        *guard = Some(token);
    }

    fn stop_timer(&self) {
        if let Some(token) = self.timer.lock().unwrap().take() {
            token.cancel();
        }
    }
}

impl Drop for Refresher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl Shared {
    /// Cancel the previous cycle, bump the generation, and spawn a new one.
    fn start_cycle(self: Arc<Self>) {
        let token = CancellationToken::new();
        let generation = {
            let mut cycle = self.cycle.lock().unwrap();
            if let Some(previous) = cycle.take() {
                previous.cancel();
            }
            *cycle = Some(token.clone());
            self.generation.fetch_add(1, Ordering::SeqCst) + 1
        };

        self.state.send_modify(|s| {
            s.busy = true;
            s.error = None;
        });

        debug!(generation, "refresh cycle started");
        tokio::spawn(self.run_cycle(generation, token));
    }

    async fn run_cycle(self: Arc<Self>, generation: u64, cancel: CancellationToken) {
        let result = self.source.fetch(&cancel).await;

        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(generation, "discarding superseded cycle result");
            return;
        }

        match result {
            Ok(snapshot) => {
                info!(generation, "refresh cycle succeeded");
                self.state.send_modify(|s| {
                    s.snapshot = Some(snapshot.clone());
                    s.error = None;
                    s.busy = false;
                    s.last_updated = Some(OffsetDateTime::now_utc());
                });

                let store = Arc::clone(&self.store);
                tokio::task::spawn_blocking(move || store.save(&snapshot));
            }
            Err(FetchError::Cancelled) => {
                debug!(generation, "refresh cycle cancelled");
                self.state.send_modify(|s| s.busy = false);
            }
            Err(e) => {
                warn!(generation, "refresh cycle failed: {e}");

                // If nothing is on screen yet, fall back to whatever the
                // cache still holds.
                let fallback = if self.state.borrow().snapshot.is_none() {
                    self.store.load()
                } else {
                    None
                };
                let cached_at = fallback
                    .is_some()
                    .then(|| self.store.info().map(|record| record.timestamp))
                    .flatten();

                self.state.send_modify(|s| {
                    if let Some(snapshot) = fallback {
                        s.snapshot = Some(snapshot);
                        s.last_updated = cached_at;
                    }
                    s.error = Some(describe_error(&e));
                    s.busy = false;
                });
            }
        }
    }

    fn cancel_inflight(&self) {
        if let Some(token) = self.cycle.lock().unwrap().take() {
            token.cancel();
        }
    }
}

/// Map a fetch error to a user-facing message.
fn describe_error(error: &FetchError) -> String {
    match error {
        FetchError::Http(e) if e.is_timeout() => {
            "Connection to the weather service timed out".to_string()
        }
        FetchError::Http(_) => "Network error while contacting the weather service".to_string(),
        FetchError::Status { status } => {
            format!("Weather service returned status {status}")
        }
        FetchError::Parse(_) => "Received malformed data from the weather service".to_string(),
        other => other.to_string(),
    }
}

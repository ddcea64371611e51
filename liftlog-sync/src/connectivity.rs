//! Connectivity watcher.
//!
//! Probes the endpoint on an interval and fires the replay trigger on
//! the offline-to-online transition. This stands in for a platform
//! "connectivity restored" event: there is no latency bound between the
//! network returning and the trigger firing, only the guarantee that the
//! scheduler never runs two replays at once.

use crate::client::ActionApi;
use crate::scheduler::{SchedulerHandle, SYNC_TRIGGER};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Configuration for the connectivity watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectivityConfig {
    /// How often to probe the endpoint.
    pub probe_interval: Duration,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            probe_interval: Duration::from_secs(30),
        }
    }
}

/// Spawns the connectivity probe task.
pub struct ConnectivityWatcher;

impl ConnectivityWatcher {
    /// Starts watching. The watcher begins in the offline state, so an
    /// endpoint that is already reachable fires one trigger on the first
    /// probe; that first run catches up anything queued before restart.
    pub fn spawn(
        api: ActionApi,
        scheduler: SchedulerHandle,
        config: ConnectivityConfig,
    ) -> WatcherHandle {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(config.probe_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut online = false;

            loop {
                ticker.tick().await;
                if !flag.load(Ordering::SeqCst) {
                    break;
                }

                let reachable = api.probe().await;
                if reachable && !online {
                    info!("connectivity restored, requesting outbox replay");
                    if let Err(e) = scheduler.request_replay(SYNC_TRIGGER) {
                        warn!(error = %e, "replay scheduler gone, stopping connectivity watcher");
                        break;
                    }
                }
                online = reachable;
            }
            debug!("connectivity watcher stopped");
        });

        WatcherHandle { running }
    }
}

/// Handle for stopping the connectivity watcher.
pub struct WatcherHandle {
    running: Arc<AtomicBool>,
}

impl WatcherHandle {
    /// Asks the watcher to stop after its current tick.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Whether the watcher has been asked to keep running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

//! The background replay worker.
//!
//! One task owns the replayer and drains a trigger channel, so replay
//! runs are serialized by construction: however many wakes arrive,
//! at most one replay is in flight at any time, and wakes that land
//! while the channel is full coalesce into the one already pending.

use crate::error::{SyncError, SyncResult};
use crate::replayer::SyncReplayer;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, info};

/// The single trigger name shared by every action kind. One name, one
/// arrival-ordered stream; there are no per-action triggers.
pub const SYNC_TRIGGER: &str = "sync-new-data";

/// Configuration for the replay worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayConfig {
    /// The trigger name the worker answers to. Wakes carrying any other
    /// name are logged and ignored.
    pub trigger: String,
    /// Pending-wake capacity. Past this, wakes coalesce.
    pub queue_depth: usize,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            trigger: SYNC_TRIGGER.to_string(),
            queue_depth: 8,
        }
    }
}

/// Spawns and wires the replay worker task.
pub struct ReplayScheduler;

impl ReplayScheduler {
    /// Spawns the worker on the current runtime and returns the handle
    /// used to request replays. The worker stops when every handle is
    /// dropped.
    pub fn spawn(replayer: SyncReplayer, config: ReplayConfig) -> SchedulerHandle {
        let (tx, mut rx) = mpsc::channel::<String>(config.queue_depth);

        tokio::spawn(async move {
            while let Some(trigger) = rx.recv().await {
                if trigger != config.trigger {
                    debug!(%trigger, "ignoring unknown sync trigger");
                    continue;
                }
                let report = replayer.replay().await;
                if report.attempted > 0 {
                    info!(
                        attempted = report.attempted,
                        delivered = report.delivered,
                        cleared = report.cleared,
                        "replay run finished"
                    );
                }
            }
            debug!("replay scheduler stopped");
        });

        SchedulerHandle { tx }
    }
}

/// Handle for requesting background replays.
#[derive(Clone)]
pub struct SchedulerHandle {
    tx: mpsc::Sender<String>,
}

impl SchedulerHandle {
    /// Registers interest in a replay under the given trigger name.
    ///
    /// Returns `SchedulerUnavailable` when the worker is gone, which is
    /// how an environment without background sync looks to callers: the
    /// dispatcher turns it into an explicit failure instead of leaving
    /// records queued with nothing watching them.
    pub fn request_replay(&self, trigger: &str) -> SyncResult<()> {
        match self.tx.try_send(trigger.to_string()) {
            Ok(()) => Ok(()),
            // A full queue already holds a pending wake; the interest
            // is satisfied by the run that wake produces.
            Err(TrySendError::Full(_)) => Ok(()),
            Err(TrySendError::Closed(_)) => Err(SyncError::SchedulerUnavailable),
        }
    }

    /// Whether the worker is still running.
    pub fn is_available(&self) -> bool {
        !self.tx.is_closed()
    }

    /// A handle whose worker never existed, for environments where
    /// background sync is unsupported (and for tests exercising the
    /// explicit-failure path).
    pub fn unavailable() -> Self {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        Self { tx }
    }
}

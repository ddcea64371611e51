//! Client-facing action dispatch.
//!
//! `dispatch` tries the network first and degrades to the durable
//! outbox on transport failure. The outcome is a four-way enum rather
//! than a `Result` because three of the four cases are normal operation
//! and every caller has to branch on all of them.

use crate::client::ActionApi;
use crate::error::SyncError;
use crate::scheduler::{SchedulerHandle, SYNC_TRIGGER};
use liftlog_outbox::OutboxStore;
use liftlog_types::{ActionPayload, WorkoutSession};
use tracing::{debug, info, warn};

/// What happened to a dispatched action.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum DispatchOutcome {
    /// The endpoint accepted the action.
    Delivered,
    /// The endpoint declined the action. Not queued: a logical
    /// rejection would be rejected again on replay.
    Rejected { reason: String },
    /// The network failed; the action is safe in the outbox and the
    /// background replayer has been asked to run when connectivity
    /// returns.
    QueuedForSync,
    /// The action was neither delivered nor safely queued. The caller
    /// must surface this; nothing below will retry it.
    Failed { reason: String },
}

/// Dispatches user actions: immediate send, outbox fallback.
#[derive(Clone)]
pub struct ActionDispatcher {
    api: ActionApi,
    outbox: OutboxStore,
    scheduler: SchedulerHandle,
}

impl ActionDispatcher {
    /// Creates a dispatcher over an endpoint client, an outbox, and a
    /// handle to the background replay scheduler.
    pub fn new(api: ActionApi, outbox: OutboxStore, scheduler: SchedulerHandle) -> Self {
        Self {
            api,
            outbox,
            scheduler,
        }
    }

    /// Sends one action, falling back to the outbox on transport
    /// failure.
    pub async fn dispatch(&self, payload: ActionPayload) -> DispatchOutcome {
        match self.api.send_action(&payload).await {
            Ok(()) => {
                debug!(action = payload.name(), "action delivered");
                DispatchOutcome::Delivered
            }
            Err(SyncError::Rejected(reason)) => {
                info!(action = payload.name(), %reason, "action rejected by endpoint");
                DispatchOutcome::Rejected { reason }
            }
            Err(SyncError::Transport(cause)) => {
                info!(action = payload.name(), %cause, "network send failed, queueing for sync");
                self.queue_for_sync(&payload)
            }
            Err(other) => {
                // Undecodable endpoint responses are surfaced like
                // rejections: the endpoint was reached, so replaying
                // the same bytes is not going to help.
                warn!(action = payload.name(), error = %other, "send failed without transport error");
                DispatchOutcome::Rejected {
                    reason: other.to_string(),
                }
            }
        }
    }

    fn queue_for_sync(&self, payload: &ActionPayload) -> DispatchOutcome {
        let record = match self.outbox.enqueue(payload) {
            Ok(record) => record,
            Err(e) => {
                warn!(action = payload.name(), error = %e, "action lost: outbox unavailable");
                return DispatchOutcome::Failed {
                    reason: format!("network send failed and the action could not be queued: {e}"),
                };
            }
        };

        match self.scheduler.request_replay(SYNC_TRIGGER) {
            Ok(()) => DispatchOutcome::QueuedForSync,
            Err(e) => {
                // The record is durable, but nothing will replay it on
                // its own. Tell the user instead of pretending.
                warn!(seq = record.seq, error = %e, "queued action has no background replayer");
                DispatchOutcome::Failed {
                    reason: format!("action queued locally but background sync is unavailable: {e}"),
                }
            }
        }
    }

    // ── Session conveniences ─────────────────────────────────────

    /// Dispatches a set logged in the given session.
    pub async fn add_set(
        &self,
        session: &WorkoutSession,
        exercise: impl Into<String>,
        weight: f64,
        reps: u32,
    ) -> DispatchOutcome {
        self.dispatch(session.add_set(exercise, weight, reps)).await
    }

    /// Dispatches the end of the given session.
    pub async fn end_workout(&self, session: &WorkoutSession) -> DispatchOutcome {
        self.dispatch(session.finish()).await
    }

    /// Dispatches a bodyweight measurement.
    pub async fn add_bodyweight(&self, weight: f64) -> DispatchOutcome {
        self.dispatch(ActionPayload::AddWeight { weight }).await
    }
}

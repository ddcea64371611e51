//! Background outbox replay.

use crate::client::ActionApi;
use liftlog_outbox::OutboxStore;
use tracing::{debug, info, warn};

/// What a replay run did. For logging and tests; replay failures never
/// propagate, since no interactive surface exists when a run fires.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayReport {
    /// Records in the drained snapshot.
    pub attempted: usize,
    /// Records the endpoint accepted this run.
    pub delivered: usize,
    /// Whether the snapshot was cleared.
    pub cleared: bool,
}

/// Replays queued actions against the endpoint.
///
/// The queue lifecycle is all-or-nothing: a snapshot clears only when
/// every record in it was sent successfully. A failure leaves the whole
/// snapshot for the next trigger, which re-sends records that already
/// succeeded this run; the endpoint has to tolerate such duplicates
/// (at-least-once delivery).
#[derive(Clone)]
pub struct SyncReplayer {
    api: ActionApi,
    outbox: OutboxStore,
}

impl SyncReplayer {
    /// Creates a replayer over an endpoint client and an outbox.
    pub fn new(api: ActionApi, outbox: OutboxStore) -> Self {
        Self { api, outbox }
    }

    /// Runs one replay pass: drain, re-send sequentially in insertion
    /// order, clear the snapshot if and only if every send succeeded.
    ///
    /// Sends are sequential to bound concurrent load on the endpoint,
    /// and the pass stops at the first failure. Cross-record ordering
    /// carries no meaning; each record is independent at the endpoint.
    pub async fn replay(&self) -> ReplayReport {
        let snapshot = match self.outbox.drain() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "replay skipped: outbox unavailable");
                return ReplayReport::default();
            }
        };

        if snapshot.is_empty() {
            debug!("outbox empty, nothing to replay");
            return ReplayReport::default();
        }

        let attempted = snapshot.len();
        let mut delivered = 0;
        for record in &snapshot {
            match self.api.send_action(&record.payload).await {
                Ok(()) => {
                    debug!(seq = record.seq, action = record.payload.name(), "replayed action");
                    delivered += 1;
                }
                Err(e) => {
                    warn!(
                        seq = record.seq,
                        action = record.payload.name(),
                        error = %e,
                        "replay send failed, leaving queue for next trigger"
                    );
                    return ReplayReport {
                        attempted,
                        delivered,
                        cleared: false,
                    };
                }
            }
        }

        let cleared = match self.outbox.clear(&snapshot) {
            Ok(deleted) => {
                info!(deleted, "outbox replayed and cleared");
                true
            }
            Err(e) => {
                // Everything was delivered but the snapshot stuck
                // around; the next run re-sends it (at-least-once).
                warn!(error = %e, "replayed batch could not be cleared");
                false
            }
        };

        ReplayReport {
            attempted,
            delivered,
            cleared,
        }
    }
}

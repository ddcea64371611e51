//! Action dispatch and background outbox replay for liftlog.
//!
//! The send path degrades instead of failing: an action goes to the
//! remote endpoint immediately when the network cooperates, and into the
//! durable outbox when it does not. A background worker replays the
//! outbox once connectivity returns.
//!
//! # Components
//!
//! - **ActionApi**: thin HTTP client for the endpoint's `{action, data}`
//!   POST contract and hydration GET
//! - **ActionDispatcher**: tries the network, falls back to the outbox,
//!   reports one of four outcomes callers must branch on
//! - **SyncReplayer**: drains the outbox against the endpoint and clears
//!   exactly the drained snapshot on full success
//! - **ReplayScheduler**: single worker task that serializes replay runs,
//!   woken through a shared trigger name
//! - **ConnectivityWatcher**: periodic reachability probe that fires the
//!   trigger when the endpoint comes back
//!
//! # Delivery guarantee
//!
//! At-least-once. A replay batch clears only when every send succeeded,
//! so a partial failure re-sends the whole batch on the next trigger and
//! the endpoint may see duplicates. Rejections are different: an action
//! the endpoint declined is surfaced immediately and never queued, since
//! retrying it cannot change the answer.

mod client;
mod connectivity;
mod dispatcher;
mod error;
mod replayer;
mod scheduler;

pub use client::{ActionApi, ApiConfig};
pub use connectivity::{ConnectivityConfig, ConnectivityWatcher, WatcherHandle};
pub use dispatcher::{ActionDispatcher, DispatchOutcome};
pub use error::{SyncError, SyncResult};
pub use replayer::{ReplayReport, SyncReplayer};
pub use scheduler::{ReplayConfig, ReplayScheduler, SchedulerHandle, SYNC_TRIGGER};

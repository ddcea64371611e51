//! SQLite-backed append-only outbox store.

use crate::error::{OutboxError, OutboxResult};
use chrono::{DateTime, Utc};
use liftlog_types::{ActionPayload, QueuedAction, Seq};
use rusqlite::{Connection, params};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Persistent queue of not-yet-delivered actions, backed by SQLite.
///
/// Handles are cheap to clone and share one connection; SQLite access is
/// serialized through an internal mutex, which also gives `enqueue` and
/// `clear` the ordering guarantee the replayer relies on: a record
/// enqueued after a snapshot was taken is never deleted by that
/// snapshot's `clear`.
#[derive(Clone)]
pub struct OutboxStore {
    conn: Arc<Mutex<Connection>>,
}

impl OutboxStore {
    /// Opens (or creates) an outbox at the given path.
    pub fn open(path: impl AsRef<Path>) -> OutboxResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| OutboxError::Storage(format!("failed to open outbox: {e}")))?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Opens an in-memory outbox (for testing).
    pub fn open_in_memory() -> OutboxResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| OutboxError::Storage(format!("failed to open in-memory outbox: {e}")))?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> OutboxResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS outbox (
                seq INTEGER PRIMARY KEY,
                body TEXT NOT NULL,
                queued_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS outbox_meta (
                key TEXT PRIMARY KEY,
                value INTEGER NOT NULL
            );

            INSERT OR IGNORE INTO outbox_meta (key, value) VALUES ('next_seq', 1);
            ",
        )
        .map_err(|e| OutboxError::Storage(format!("failed to init outbox schema: {e}")))?;
        Ok(())
    }

    /// Appends an action to the outbox and returns the persisted record.
    ///
    /// The sequence number is taken from the persisted counter and the
    /// counter is advanced in the same transaction, so a crash between
    /// the two cannot produce a duplicate.
    pub fn enqueue(&self, payload: &ActionPayload) -> OutboxResult<QueuedAction> {
        let body = serde_json::to_string(payload)?;
        let queued_at = Utc::now();

        let mut conn = self.conn.lock().unwrap();
        let tx = conn
            .transaction()
            .map_err(|e| OutboxError::Storage(format!("failed to begin enqueue: {e}")))?;

        let seq: i64 = tx
            .query_row("SELECT value FROM outbox_meta WHERE key = 'next_seq'", [], |row| {
                row.get(0)
            })
            .map_err(|e| OutboxError::Storage(format!("failed to read outbox counter: {e}")))?;

        tx.execute(
            "INSERT INTO outbox (seq, body, queued_at) VALUES (?1, ?2, ?3)",
            params![seq, body, queued_at.to_rfc3339()],
        )
        .map_err(|e| OutboxError::Storage(format!("failed to append to outbox: {e}")))?;

        tx.execute(
            "UPDATE outbox_meta SET value = ?1 WHERE key = 'next_seq'",
            params![seq + 1],
        )
        .map_err(|e| OutboxError::Storage(format!("failed to advance outbox counter: {e}")))?;

        tx.commit()
            .map_err(|e| OutboxError::Storage(format!("failed to commit enqueue: {e}")))?;

        debug!(seq, action = payload.name(), "queued action for background sync");
        Ok(QueuedAction {
            seq: seq as Seq,
            queued_at,
            payload: payload.clone(),
        })
    }

    /// Takes a fresh point-in-time snapshot of all queued records, in
    /// insertion order.
    ///
    /// The snapshot is not a live view: records enqueued afterwards do
    /// not appear in it, and it can be iterated any number of times.
    pub fn drain(&self) -> OutboxResult<OutboxSnapshot> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT seq, body, queued_at FROM outbox ORDER BY seq ASC")
            .map_err(|e| OutboxError::Storage(format!("failed to prepare drain: {e}")))?;

        let rows = stmt
            .query_map([], |row| {
                let seq: i64 = row.get(0)?;
                let body: String = row.get(1)?;
                let queued_at: String = row.get(2)?;
                Ok((seq, body, queued_at))
            })
            .map_err(|e| OutboxError::Storage(format!("failed to query outbox: {e}")))?;

        let mut records = Vec::new();
        for row in rows {
            let (seq, body, queued_at) =
                row.map_err(|e| OutboxError::Storage(format!("failed to read outbox row: {e}")))?;
            let payload: ActionPayload = serde_json::from_str(&body)?;
            let queued_at = DateTime::parse_from_rfc3339(&queued_at)
                .map_err(|e| {
                    OutboxError::Storage(format!("invalid queued_at in outbox row {seq}: {e}"))
                })?
                .with_timezone(&Utc);
            records.push(QueuedAction {
                seq: seq as Seq,
                queued_at,
                payload,
            });
        }
        Ok(OutboxSnapshot { records })
    }

    /// Atomically deletes exactly the records in a drained snapshot.
    ///
    /// Records enqueued after the snapshot was taken have higher sequence
    /// numbers and survive; the next `drain` observes them. Clearing an
    /// empty snapshot is a no-op.
    pub fn clear(&self, snapshot: &OutboxSnapshot) -> OutboxResult<usize> {
        let Some(last_seq) = snapshot.last_seq() else {
            return Ok(0);
        };
        let conn = self.conn.lock().unwrap();
        let deleted = conn
            .execute("DELETE FROM outbox WHERE seq <= ?1", params![last_seq as i64])
            .map_err(|e| OutboxError::Storage(format!("failed to clear outbox: {e}")))?;
        debug!(deleted, last_seq, "cleared replayed outbox records");
        Ok(deleted)
    }

    /// Number of records currently queued.
    pub fn len(&self) -> OutboxResult<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM outbox", [], |row| row.get(0))
            .map_err(|e| OutboxError::Storage(format!("failed to count outbox: {e}")))?;
        Ok(count as usize)
    }

    /// Whether the outbox has no queued records.
    pub fn is_empty(&self) -> OutboxResult<bool> {
        Ok(self.len()? == 0)
    }
}

/// A point-in-time snapshot of the outbox, in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboxSnapshot {
    records: Vec<QueuedAction>,
}

impl OutboxSnapshot {
    /// The snapshotted records, `seq` ascending.
    pub fn records(&self) -> &[QueuedAction] {
        &self.records
    }

    /// Iterates the snapshot; restartable, call as often as needed.
    pub fn iter(&self) -> impl Iterator<Item = &QueuedAction> {
        self.records.iter()
    }

    /// The highest sequence number in the snapshot, if any.
    pub fn last_seq(&self) -> Option<Seq> {
        self.records.last().map(|r| r.seq)
    }

    /// Number of records in the snapshot.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the snapshot holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a OutboxSnapshot {
    type Item = &'a QueuedAction;
    type IntoIter = std::slice::Iter<'a, QueuedAction>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

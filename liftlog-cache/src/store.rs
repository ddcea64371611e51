//! SQLite-backed generation store for captured responses.

use crate::error::{CacheError, CacheResult};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Request identity: method plus URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestKey {
    pub method: String,
    pub url: String,
}

impl RequestKey {
    /// Creates a key with an arbitrary method.
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
        }
    }

    /// Creates a GET key.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new("GET", url)
    }
}

/// A captured response body with enough metadata to serve it back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedResponse {
    /// HTTP status of the captured response.
    pub status: u16,
    /// Content type header, if the response carried one.
    pub content_type: Option<String>,
    /// Raw response body.
    pub body: Vec<u8>,
    /// When the response was captured.
    pub stored_at: DateTime<Utc>,
}

impl CachedResponse {
    /// Interprets the body as UTF-8 text, lossily.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Persistent store of captured responses, bucketed into named
/// generations with exactly one entry per key per generation.
///
/// Handles are cheap to clone and share one connection.
#[derive(Clone)]
pub struct CacheStore {
    conn: Arc<Mutex<Connection>>,
}

impl CacheStore {
    /// Opens (or creates) a cache store at the given path.
    pub fn open(path: impl AsRef<Path>) -> CacheResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| CacheError::Storage(format!("failed to open cache store: {e}")))?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Opens an in-memory cache store (for testing).
    pub fn open_in_memory() -> CacheResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| CacheError::Storage(format!("failed to open in-memory cache store: {e}")))?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> CacheResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS cache_entries (
                generation TEXT NOT NULL,
                method TEXT NOT NULL,
                url TEXT NOT NULL,
                status INTEGER NOT NULL,
                content_type TEXT,
                body BLOB NOT NULL,
                stored_at TEXT NOT NULL,
                UNIQUE(generation, method, url)
            );
            ",
        )
        .map_err(|e| CacheError::Storage(format!("failed to init cache schema: {e}")))?;
        Ok(())
    }

    /// Looks up the entry for a key in one generation. No side effects.
    pub fn lookup(&self, generation: &str, key: &RequestKey) -> CacheResult<Option<CachedResponse>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                "SELECT status, content_type, body, stored_at FROM cache_entries
                 WHERE generation = ?1 AND method = ?2 AND url = ?3",
                params![generation, key.method, key.url],
                |row| {
                    let status: i64 = row.get(0)?;
                    let content_type: Option<String> = row.get(1)?;
                    let body: Vec<u8> = row.get(2)?;
                    let stored_at: String = row.get(3)?;
                    Ok((status, content_type, body, stored_at))
                },
            )
            .optional()
            .map_err(|e| CacheError::Storage(format!("failed to query cache: {e}")))?;

        let Some((status, content_type, body, stored_at)) = row else {
            return Ok(None);
        };
        let stored_at = DateTime::parse_from_rfc3339(&stored_at)
            .map_err(|e| CacheError::Storage(format!("invalid stored_at in cache entry: {e}")))?
            .with_timezone(&Utc);
        Ok(Some(CachedResponse {
            status: status as u16,
            content_type,
            body,
            stored_at,
        }))
    }

    /// Inserts or overwrites the entry for a key in one generation.
    pub fn store(
        &self,
        generation: &str,
        key: &RequestKey,
        response: &CachedResponse,
    ) -> CacheResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO cache_entries
             (generation, method, url, status, content_type, body, stored_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                generation,
                key.method,
                key.url,
                response.status as i64,
                response.content_type,
                response.body,
                response.stored_at.to_rfc3339(),
            ],
        )
        .map_err(|e| CacheError::Storage(format!("failed to store cache entry: {e}")))?;
        debug!(generation, url = %key.url, "stored cache entry");
        Ok(())
    }

    /// Writes a batch of entries into one generation in a single
    /// transaction, so a failure leaves no partial batch behind.
    pub fn store_many(
        &self,
        generation: &str,
        entries: &[(RequestKey, CachedResponse)],
    ) -> CacheResult<usize> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn
            .transaction()
            .map_err(|e| CacheError::Storage(format!("failed to begin cache batch: {e}")))?;
        for (key, response) in entries {
            tx.execute(
                "INSERT OR REPLACE INTO cache_entries
                 (generation, method, url, status, content_type, body, stored_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    generation,
                    key.method,
                    key.url,
                    response.status as i64,
                    response.content_type,
                    response.body,
                    response.stored_at.to_rfc3339(),
                ],
            )
            .map_err(|e| CacheError::Storage(format!("failed to store cache entry: {e}")))?;
        }
        tx.commit()
            .map_err(|e| CacheError::Storage(format!("failed to commit cache batch: {e}")))?;
        Ok(entries.len())
    }

    /// Deletes every app-owned generation whose name is not in the
    /// current set. Generations without the app prefix are untouched.
    pub fn evict_stale_generations(&self, prefix: &str, current: &[&str]) -> CacheResult<usize> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT DISTINCT generation FROM cache_entries")
            .map_err(|e| CacheError::Storage(format!("failed to list generations: {e}")))?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| CacheError::Storage(format!("failed to query generations: {e}")))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| CacheError::Storage(format!("failed to read generation row: {e}")))?;

        let mut removed = 0;
        for name in names {
            if !name.starts_with(prefix) || current.contains(&name.as_str()) {
                continue;
            }
            removed += conn
                .execute("DELETE FROM cache_entries WHERE generation = ?1", params![name])
                .map_err(|e| CacheError::Storage(format!("failed to evict generation: {e}")))?;
            info!(generation = %name, "evicted stale cache generation");
        }
        Ok(removed)
    }

    /// Number of entries in one generation.
    pub fn generation_len(&self, generation: &str) -> CacheResult<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM cache_entries WHERE generation = ?1",
                params![generation],
                |row| row.get(0),
            )
            .map_err(|e| CacheError::Storage(format!("failed to count generation: {e}")))?;
        Ok(count as usize)
    }
}

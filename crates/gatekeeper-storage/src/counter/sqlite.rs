//! Durable block counters in SQLite.
//!
//! Increment-and-read is a single `INSERT .. ON CONFLICT .. RETURNING`
//! statement, which SQLite executes under its write lock. Concurrent writers,
//! including other processes sharing the database file, never lose updates.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use gatekeeper_core::errors::StorageError;
use gatekeeper_core::traits::{BlockCounterStore, Clock};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use super::expiry;
use crate::to_sqlite_err;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS block_counters (
        key        TEXT PRIMARY KEY,
        count      INTEGER NOT NULL,
        expires_at INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_block_counters_expires_at
        ON block_counters (expires_at);
";

const INCREMENT_SQL: &str = "
    INSERT INTO block_counters (key, count, expires_at) VALUES (?1, 1, ?2)
    ON CONFLICT(key) DO UPDATE SET
        count = CASE WHEN block_counters.expires_at <= ?3
                     THEN 1 ELSE block_counters.count + 1 END,
        expires_at = CASE WHEN block_counters.expires_at <= ?3
                          THEN ?2 ELSE block_counters.expires_at END
    RETURNING count
";

pub struct SqliteBlockCounterStore {
    conn: Mutex<Connection>,
    clock: Arc<dyn Clock>,
}

impl SqliteBlockCounterStore {
    /// Open (or create) a counter database at `path`.
    pub fn open(path: &Path, clock: Arc<dyn Clock>) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(to_sqlite_err)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA busy_timeout = 5000;
            ",
        )
        .map_err(to_sqlite_err)?;
        Self::with_connection(conn, clock)
    }

    /// Private in-memory database (tests, single-process deployments).
    pub fn open_in_memory(clock: Arc<dyn Clock>) -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(to_sqlite_err)?;
        Self::with_connection(conn, clock)
    }

    fn with_connection(conn: Connection, clock: Arc<dyn Clock>) -> Result<Self, StorageError> {
        conn.execute_batch(SCHEMA).map_err(to_sqlite_err)?;
        Ok(Self {
            conn: Mutex::new(conn),
            clock,
        })
    }

    /// Delete expired rows. Returns how many were removed.
    pub fn purge_expired(&self) -> Result<usize, StorageError> {
        let now = self.clock.now().timestamp();
        let conn = self.lock()?;
        conn.execute(
            "DELETE FROM block_counters WHERE expires_at <= ?1",
            params![now],
        )
        .map_err(to_sqlite_err)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StorageError> {
        self.conn.lock().map_err(|_| StorageError::Unavailable {
            backend: "sqlite block counter".to_string(),
            message: "connection mutex poisoned".to_string(),
        })
    }
}

#[async_trait]
impl BlockCounterStore for SqliteBlockCounterStore {
    async fn increment(&self, key: &str, ttl: Duration) -> Result<u64, StorageError> {
        let now = self.clock.now();
        let expires_at = expiry(now, ttl)?.timestamp();
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row(
                INCREMENT_SQL,
                params![key, expires_at, now.timestamp()],
                |row| row.get(0),
            )
            .map_err(to_sqlite_err)?;
        debug!(key, count, "block counter incremented");
        Ok(count.max(0) as u64)
    }

    async fn get(&self, key: &str) -> Result<Option<u64>, StorageError> {
        let now = self.clock.now().timestamp();
        let conn = self.lock()?;
        let count: Option<i64> = conn
            .query_row(
                "SELECT count FROM block_counters WHERE key = ?1 AND expires_at > ?2",
                params![key, now],
                |row| row.get(0),
            )
            .optional()
            .map_err(to_sqlite_err)?;
        Ok(count.map(|c| c.max(0) as u64))
    }
}

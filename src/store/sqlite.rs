use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{Connection, params};
use tracing::{debug, warn};

use super::{
    CleanupReport, RuntimeRecord, RuntimeSummary, StoreError, UsageRecord, UsageStore,
    runtime_cutoff, usage_cutoff,
};

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS usages (
    input TEXT NOT NULL,
    item_id TEXT NOT NULL,
    timestamp INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS usages_timestamp ON usages (timestamp);
CREATE TABLE IF NOT EXISTS runtimes (
    extension_id TEXT NOT NULL,
    runtime INTEGER NOT NULL,
    timestamp INTEGER NOT NULL
);
";

/// SQLite-backed store. Timestamps are stored as UTC unix microseconds.
pub struct SqliteStore {
    path: Option<PathBuf>,
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and apply retention.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let store = Self::with_connection(conn, Some(path.to_path_buf()))?;
        match store.cleanup(Utc::now()) {
            Ok(report) => debug!(?report, path = %path.display(), "applied history retention"),
            Err(err) => warn!(%err, "unable to clean up usage history"),
        }
        Ok(store)
    }

    /// A database that lives only as long as the store.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?, None)
    }

    fn with_connection(conn: Connection, path: Option<PathBuf>) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    /// Location of the database file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

fn to_micros(timestamp: DateTime<Utc>) -> i64 {
    timestamp.timestamp_micros()
}

fn from_micros(micros: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp_micros(micros).ok_or(StoreError::Timestamp(micros))
}

impl UsageStore for SqliteStore {
    fn append_usage(&self, record: &UsageRecord) -> Result<(), StoreError> {
        self.conn.lock().execute(
            "INSERT INTO usages (input, item_id, timestamp) VALUES (?1, ?2, ?3)",
            params![record.input, record.item_id, to_micros(record.timestamp)],
        )?;
        Ok(())
    }

    fn append_runtimes(&self, records: &[RuntimeRecord]) -> Result<(), StoreError> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        {
            let mut insert = tx.prepare_cached(
                "INSERT INTO runtimes (extension_id, runtime, timestamp) VALUES (?1, ?2, ?3)",
            )?;
            for record in records {
                let micros = i64::try_from(record.elapsed_micros).unwrap_or(i64::MAX);
                insert.execute(params![record.handler_id, micros, to_micros(record.timestamp)])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn usages_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<UsageRecord>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT input, item_id, timestamp FROM usages \
             WHERE timestamp >= ?1 ORDER BY timestamp, rowid",
        )?;
        let rows = stmt.query_map(params![to_micros(cutoff)], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (input, item_id, micros) = row?;
            records.push(UsageRecord {
                input,
                item_id,
                timestamp: from_micros(micros)?,
            });
        }
        Ok(records)
    }

    fn runtime_summary(&self) -> Result<Vec<RuntimeSummary>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT extension_id, COUNT(*), AVG(runtime) FROM runtimes \
             GROUP BY extension_id ORDER BY extension_id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(RuntimeSummary {
                handler_id: row.get(0)?,
                samples: row.get::<_, i64>(1)?.max(0) as u64,
                mean_micros: row.get(2)?,
            })
        })?;

        let mut summary = Vec::new();
        for row in rows {
            summary.push(row?);
        }
        Ok(summary)
    }

    fn cleanup(&self, now: DateTime<Utc>) -> Result<CleanupReport, StoreError> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let usages = tx.execute(
            "DELETE FROM usages WHERE timestamp < ?1",
            params![to_micros(usage_cutoff(now))],
        )?;
        let runtimes = tx.execute(
            "DELETE FROM runtimes WHERE timestamp < ?1",
            params![to_micros(runtime_cutoff(now))],
        )?;
        tx.commit()?;
        Ok(CleanupReport { usages, runtimes })
    }
}

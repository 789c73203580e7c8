//! Persistence of usage history and handler runtimes.
//!
//! The core only appends to a store and reads aggregated usage back when the
//! ranker refreshes. Retention is the store's business: [`UsageStore::cleanup`]
//! drops usages older than [`USAGE_RETENTION_DAYS`] and runtimes older than
//! [`RUNTIME_RETENTION_DAYS`].

mod memory;
mod sqlite;

use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Utc};
use thiserror::Error;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

pub const USAGE_RETENTION_DAYS: i64 = 90;
pub const RUNTIME_RETENTION_DAYS: i64 = 7;

/// One activation of an item for a given input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageRecord {
    pub input: String,
    pub item_id: String,
    pub timestamp: DateTime<Utc>,
}

impl UsageRecord {
    pub fn now(input: impl Into<String>, item_id: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            item_id: item_id.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Wall time one handler spent on one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeRecord {
    pub handler_id: String,
    pub elapsed_micros: u64,
    pub timestamp: DateTime<Utc>,
}

/// Aggregated runtimes of one handler.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RuntimeSummary {
    pub handler_id: String,
    pub samples: u64,
    pub mean_micros: f64,
}

/// Rows removed by [`UsageStore::cleanup`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub usages: usize,
    pub runtimes: usize,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to prepare store location: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored timestamp {0} is out of range")]
    Timestamp(i64),

    #[error("store is unavailable: {0}")]
    Unavailable(String),
}

/// Append-only store for usage and runtime history.
///
/// Writes are expected to be transactional per call. Callers treat every error
/// as non-fatal.
pub trait UsageStore: Send + Sync {
    fn append_usage(&self, record: &UsageRecord) -> Result<(), StoreError>;

    /// Append a batch of runtimes in one transaction.
    fn append_runtimes(&self, records: &[RuntimeRecord]) -> Result<(), StoreError>;

    /// Usages recorded at or after `cutoff`, oldest first.
    fn usages_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<UsageRecord>, StoreError>;

    /// Per-handler runtime statistics, ordered by handler id.
    fn runtime_summary(&self) -> Result<Vec<RuntimeSummary>, StoreError>;

    /// Apply retention relative to `now`.
    fn cleanup(&self, now: DateTime<Utc>) -> Result<CleanupReport, StoreError>;

    /// Recency-weighted usage count per item since `cutoff`.
    fn usage_counts_since(
        &self,
        cutoff: DateTime<Utc>,
        half_life: TimeDelta,
    ) -> Result<HashMap<String, f64>, StoreError> {
        Ok(weighted_counts(&self.usages_since(cutoff)?, half_life))
    }
}

/// Sum usages per item, halving the weight of a use for every `half_life` it
/// lies before the newest use in `records`.
///
/// Weights are relative to the newest record rather than the wall clock, so
/// the same records always produce the same counts. Which records take part
/// is up to the caller's cutoff, and that one usually does follow the clock.
pub fn weighted_counts(records: &[UsageRecord], half_life: TimeDelta) -> HashMap<String, f64> {
    let mut counts = HashMap::new();
    let Some(newest) = records.iter().map(|record| record.timestamp).max() else {
        return counts;
    };
    let half_life_ms = half_life.num_milliseconds().max(1) as f64;

    for record in records {
        let age_ms = (newest - record.timestamp).num_milliseconds() as f64;
        let weight = (-age_ms / half_life_ms).exp2();
        *counts.entry(record.item_id.clone()).or_insert(0.0) += weight;
    }
    counts
}

pub(crate) fn usage_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now - TimeDelta::days(USAGE_RETENTION_DAYS)
}

pub(crate) fn runtime_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now - TimeDelta::days(RUNTIME_RETENTION_DAYS)
}

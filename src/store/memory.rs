use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use super::{
    CleanupReport, RuntimeRecord, RuntimeSummary, StoreError, UsageRecord, UsageStore,
    runtime_cutoff, usage_cutoff,
};

/// Process-local store. History is lost on exit.
#[derive(Default)]
pub struct MemoryStore {
    usages: Mutex<Vec<UsageRecord>>,
    runtimes: Mutex<Vec<RuntimeRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every runtime appended so far.
    pub fn runtimes(&self) -> Vec<RuntimeRecord> {
        self.runtimes.lock().clone()
    }
}

impl UsageStore for MemoryStore {
    fn append_usage(&self, record: &UsageRecord) -> Result<(), StoreError> {
        self.usages.lock().push(record.clone());
        Ok(())
    }

    fn append_runtimes(&self, records: &[RuntimeRecord]) -> Result<(), StoreError> {
        self.runtimes.lock().extend_from_slice(records);
        Ok(())
    }

    fn usages_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<UsageRecord>, StoreError> {
        let mut records: Vec<_> = self
            .usages
            .lock()
            .iter()
            .filter(|record| record.timestamp >= cutoff)
            .cloned()
            .collect();
        records.sort_by_key(|record| record.timestamp);
        Ok(records)
    }

    fn runtime_summary(&self) -> Result<Vec<RuntimeSummary>, StoreError> {
        let mut totals: BTreeMap<String, (u64, u64)> = BTreeMap::new();
        for record in self.runtimes.lock().iter() {
            let entry = totals.entry(record.handler_id.clone()).or_default();
            entry.0 += 1;
            entry.1 += record.elapsed_micros;
        }
        Ok(totals
            .into_iter()
            .map(|(handler_id, (samples, total))| RuntimeSummary {
                handler_id,
                samples,
                mean_micros: total as f64 / samples as f64,
            })
            .collect())
    }

    fn cleanup(&self, now: DateTime<Utc>) -> Result<CleanupReport, StoreError> {
        let mut report = CleanupReport::default();

        let mut usages = self.usages.lock();
        let before = usages.len();
        let cutoff = usage_cutoff(now);
        usages.retain(|record| record.timestamp >= cutoff);
        report.usages = before - usages.len();

        let mut runtimes = self.runtimes.lock();
        let before = runtimes.len();
        let cutoff = runtime_cutoff(now);
        runtimes.retain(|record| record.timestamp >= cutoff);
        report.runtimes = before - runtimes.len();

        Ok(report)
    }
}

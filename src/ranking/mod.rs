//! Usage-learned ordering of merged query results.

mod snapshot;

use std::cmp::Ordering;
use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::{TimeDelta, Utc};
use flint_plugin_api::Match;
use tracing::debug;

use crate::store::{StoreError, UsageStore};

pub use snapshot::RankSnapshot;

/// Tuning for how usage history turns into rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankingOptions {
    /// A use this much older than the newest one counts half as much.
    pub half_life: TimeDelta,
    /// Usages older than this are ignored.
    pub window: TimeDelta,
}

impl Default for RankingOptions {
    fn default() -> Self {
        Self {
            half_life: TimeDelta::days(14),
            window: TimeDelta::days(crate::store::USAGE_RETENTION_DAYS),
        }
    }
}

/// Orders matches by handler score, then learned usage, then item id.
///
/// Comparisons only consult the cached [`RankSnapshot`]. The snapshot is
/// rebuilt by [`refresh`](Self::refresh) and swapped in whole, so concurrent
/// sorts always see one consistent table.
pub struct MatchRanker {
    store: Arc<dyn UsageStore>,
    options: RankingOptions,
    snapshot: ArcSwap<RankSnapshot>,
}

impl MatchRanker {
    /// Create a ranker with an empty snapshot. Call [`refresh`](Self::refresh)
    /// to load history.
    pub fn new(store: Arc<dyn UsageStore>, options: RankingOptions) -> Self {
        Self {
            store,
            options,
            snapshot: ArcSwap::from_pointee(RankSnapshot::default()),
        }
    }

    pub fn options(&self) -> RankingOptions {
        self.options
    }

    /// The store usage history is read from.
    pub fn store(&self) -> &Arc<dyn UsageStore> {
        &self.store
    }

    /// Recompute the snapshot from the store. On error the previous snapshot
    /// stays in place.
    ///
    /// The window is measured back from the wall clock, so a usage that ages
    /// past it drops out on the next refresh even if nothing was written.
    pub fn refresh(&self) -> Result<usize, StoreError> {
        let cutoff = Utc::now() - self.options.window;
        let counts = self
            .store
            .usage_counts_since(cutoff, self.options.half_life)?;
        let snapshot = RankSnapshot::from_counts(counts);
        let ranked = snapshot.len();
        self.snapshot.store(Arc::new(snapshot));
        debug!(ranked, "refreshed match ranking");
        Ok(ranked)
    }

    /// The snapshot currently used for comparisons.
    pub fn snapshot(&self) -> Arc<RankSnapshot> {
        self.snapshot.load_full()
    }

    /// Total order used to sort merged matches.
    pub fn compare(&self, a: &Match, b: &Match) -> Ordering {
        compare_with(&self.snapshot.load(), a, b)
    }

    /// Sort `matches` against a single snapshot.
    pub fn sort(&self, matches: &mut [Match]) {
        let snapshot = self.snapshot.load_full();
        matches.sort_by(|a, b| compare_with(&snapshot, a, b));
    }
}

fn compare_with(snapshot: &RankSnapshot, a: &Match, b: &Match) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| snapshot.rank_of(a.id()).cmp(&snapshot.rank_of(b.id())))
        .then_with(|| a.id().cmp(b.id()))
}

#[cfg(test)]
mod tests;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

use chrono::{DateTime, TimeDelta, Utc};
use flint_plugin_api::{Item, Match, StandardItem};

use super::*;
use crate::store::{
    CleanupReport, MemoryStore, RuntimeRecord, RuntimeSummary, UsageRecord, UsageStore,
};

fn matched(id: &str, score: u16) -> Match {
    let item: Arc<dyn Item> = Arc::new(StandardItem::new(id, id, "test"));
    Match::scored(item, score)
}

fn use_item(store: &MemoryStore, id: &str, days_ago: i64) {
    store
        .append_usage(&UsageRecord {
            input: String::new(),
            item_id: id.into(),
            timestamp: Utc::now() - TimeDelta::days(days_ago),
        })
        .expect("append usage");
}

fn ranker_with(store: Arc<MemoryStore>) -> MatchRanker {
    MatchRanker::new(store, RankingOptions::default())
}

#[test]
fn frequently_used_items_rank_first() {
    let store = Arc::new(MemoryStore::new());
    use_item(&store, "b", 0);
    use_item(&store, "b", 0);
    use_item(&store, "a", 0);
    let ranker = ranker_with(Arc::clone(&store));
    assert_eq!(ranker.refresh().expect("refresh"), 2);

    let mut matches = vec![matched("c", 0), matched("a", 0), matched("b", 0)];
    ranker.sort(&mut matches);
    let ids: Vec<_> = matches.iter().map(Match::id).collect();
    assert_eq!(ids, ["b", "a", "c"]);
}

#[test]
fn recency_outweighs_stale_frequency() {
    let store = Arc::new(MemoryStore::new());
    for _ in 0..3 {
        use_item(&store, "old", 60);
    }
    use_item(&store, "new", 0);
    let ranker = ranker_with(Arc::clone(&store));
    ranker.refresh().expect("refresh");

    let snapshot = ranker.snapshot();
    assert_eq!(snapshot.position("new"), Some(0));
    assert_eq!(snapshot.position("old"), Some(1));
}

#[test]
fn handler_score_dominates_usage() {
    let store = Arc::new(MemoryStore::new());
    use_item(&store, "popular", 0);
    let ranker = ranker_with(Arc::clone(&store));
    ranker.refresh().expect("refresh");

    let mut matches = vec![matched("popular", 0), matched("relevant", 10)];
    ranker.sort(&mut matches);
    assert_eq!(matches[0].id(), "relevant");
}

#[test]
fn ties_break_by_id() {
    let ranker = ranker_with(Arc::new(MemoryStore::new()));
    let mut matches = vec![matched("zeta", 0), matched("alpha", 0), matched("mid", 0)];
    ranker.sort(&mut matches);
    let ids: Vec<_> = matches.iter().map(Match::id).collect();
    assert_eq!(ids, ["alpha", "mid", "zeta"]);
}

#[test]
fn refresh_is_idempotent() {
    let store = Arc::new(MemoryStore::new());
    use_item(&store, "a", 3);
    use_item(&store, "b", 1);
    use_item(&store, "b", 20);
    use_item(&store, "c", 1);
    let ranker = ranker_with(Arc::clone(&store));

    ranker.refresh().expect("first refresh");
    let first = ranker.snapshot();
    ranker.refresh().expect("second refresh");
    assert_eq!(*first, *ranker.snapshot());
}

#[test]
fn compare_is_a_strict_weak_ordering() {
    let store = Arc::new(MemoryStore::new());
    use_item(&store, "b", 0);
    use_item(&store, "d", 2);
    let ranker = ranker_with(Arc::clone(&store));
    ranker.refresh().expect("refresh");

    let matches = [
        matched("a", 0),
        matched("b", 0),
        matched("c", 5),
        matched("d", 0),
        matched("e", 5),
    ];
    for a in &matches {
        assert_eq!(ranker.compare(a, a), Ordering::Equal);
        for b in &matches {
            assert_eq!(ranker.compare(a, b), ranker.compare(b, a).reverse());
            for c in &matches {
                if ranker.compare(a, b) == Ordering::Less && ranker.compare(b, c) == Ordering::Less
                {
                    assert_eq!(ranker.compare(a, c), Ordering::Less);
                }
            }
        }
    }
}

struct FlakyStore {
    inner: MemoryStore,
    failing: AtomicBool,
}

impl UsageStore for FlakyStore {
    fn append_usage(&self, record: &UsageRecord) -> Result<(), StoreError> {
        self.inner.append_usage(record)
    }

    fn append_runtimes(&self, records: &[RuntimeRecord]) -> Result<(), StoreError> {
        self.inner.append_runtimes(records)
    }

    fn usages_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<UsageRecord>, StoreError> {
        if self.failing.load(AtomicOrdering::SeqCst) {
            return Err(StoreError::Unavailable("disk on fire".into()));
        }
        self.inner.usages_since(cutoff)
    }

    fn runtime_summary(&self) -> Result<Vec<RuntimeSummary>, StoreError> {
        self.inner.runtime_summary()
    }

    fn cleanup(&self, now: DateTime<Utc>) -> Result<CleanupReport, StoreError> {
        self.inner.cleanup(now)
    }
}

#[test]
fn failed_refresh_keeps_previous_snapshot() {
    let store = Arc::new(FlakyStore {
        inner: MemoryStore::new(),
        failing: AtomicBool::new(false),
    });
    use_item(&store.inner, "a", 0);
    let ranker = MatchRanker::new(Arc::clone(&store) as Arc<dyn UsageStore>, RankingOptions::default());
    ranker.refresh().expect("refresh");

    use_item(&store.inner, "b", 0);
    use_item(&store.inner, "b", 0);
    store.failing.store(true, AtomicOrdering::SeqCst);
    assert!(ranker.refresh().is_err());

    let snapshot = ranker.snapshot();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot.position("a"), Some(0));
    assert_eq!(snapshot.position("b"), None);
}

#[test]
fn usage_outside_the_window_is_ignored() {
    let store = Arc::new(MemoryStore::new());
    use_item(&store, "ancient", 200);
    let ranker = ranker_with(Arc::clone(&store));
    assert_eq!(ranker.refresh().expect("refresh"), 0);
    assert!(ranker.snapshot().is_empty());
}

#[test]
fn usage_ages_out_of_the_window_without_a_write() {
    let store = Arc::new(MemoryStore::new());
    let window = TimeDelta::days(1);
    store
        .append_usage(&UsageRecord {
            input: String::new(),
            item_id: "edge".into(),
            timestamp: Utc::now() - window + TimeDelta::milliseconds(200),
        })
        .expect("append usage");
    let ranker = MatchRanker::new(
        Arc::clone(&store) as Arc<dyn UsageStore>,
        RankingOptions {
            window,
            ..RankingOptions::default()
        },
    );

    assert_eq!(ranker.refresh().expect("refresh"), 1);
    std::thread::sleep(std::time::Duration::from_millis(400));
    assert_eq!(ranker.refresh().expect("refresh"), 0);
    assert_eq!(ranker.snapshot().position("edge"), None);
}

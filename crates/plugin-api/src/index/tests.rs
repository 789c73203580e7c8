use std::sync::Arc;
use std::thread;

use proptest::prelude::*;

use super::*;
use crate::item::{Item, StandardItem};

fn item(id: &str, keywords: &[&str]) -> Arc<StandardItem> {
    Arc::new(StandardItem::new(id, id, "test").with_keywords(keywords.iter().copied()))
}

fn ids(results: &[Arc<StandardItem>]) -> Vec<String> {
    results.iter().map(|item| item.id().to_string()).collect()
}

fn sample_index() -> OfflineIndex<StandardItem> {
    let mut index = OfflineIndex::new();
    index.add(item("A", &["firefox", "browser"]));
    index.add(item("B", &["files", "explorer"]));
    index
}

#[test]
fn prefix_matches_every_item_sharing_the_prefix() {
    let index = sample_index();
    assert_eq!(ids(&index.search("fi")), ["A", "B"]);
}

#[test]
fn tokens_are_conjunctive() {
    let index = sample_index();
    assert_eq!(ids(&index.search("fi browser")), ["A"]);
    assert!(index.search("fi nothing").is_empty());
}

#[test]
fn search_is_case_insensitive() {
    let index = sample_index();
    assert_eq!(ids(&index.search("FIRE")), ["A"]);
}

#[test]
fn typo_requires_fuzzy_mode() {
    let mut index = sample_index();
    assert!(index.search("firefix").is_empty());

    index.set_fuzzy(true);
    assert_eq!(ids(&index.search("firefix")), ["A"]);
    assert_eq!(ids(&index.search("fierfox")), ["A"]);
}

#[test]
fn short_tokens_never_match_fuzzily() {
    let mut index = OfflineIndex::new();
    index.add(item("A", &["firefox"]));
    index.add(item("C", &["fo"]));
    index.set_fuzzy(true);
    assert_eq!(ids(&index.search("fo")), ["C"]);
}

#[test]
fn separators_split_keywords_and_terms() {
    let mut index = OfflineIndex::new();
    index.add(item("vlc", &["vlc-media_player"]));
    assert_eq!(ids(&index.search("media")), ["vlc"]);
    assert_eq!(ids(&index.search("vlc/play")), ["vlc"]);
}

#[test]
fn empty_terms_match_nothing() {
    let index = sample_index();
    assert!(index.search("").is_empty());
    assert!(index.search(" -_. ").is_empty());
}

#[test]
fn adding_an_existing_id_replaces_the_item() {
    let mut index = sample_index();
    index.add(item("A", &["chromium"]));

    assert_eq!(index.len(), 2);
    assert!(index.search("firefox").is_empty());
    assert_eq!(ids(&index.search("chrom")), ["A"]);
    assert_eq!(ids(&index.search("fi")), ["B"]);
}

#[test]
fn duplicate_keywords_yield_one_result() {
    let mut index = OfflineIndex::new();
    index.add(item("A", &["fire fox", "firefox", "fire"]));
    assert_eq!(ids(&index.search("fire")), ["A"]);
}

#[test]
fn remove_and_clear() {
    let mut index = sample_index();
    let removed = index.remove("B").expect("B indexed");
    assert_eq!(removed.id(), "B");
    assert!(index.search("files").is_empty());

    index.add(item("D", &["dolphin"]));
    assert_eq!(index.len(), 2);

    index.clear();
    assert!(index.is_empty());
    assert!(index.search("fi").is_empty());
}

#[test]
fn shared_index_publishes_rebuilds() {
    let shared = Arc::new(SharedIndex::<StandardItem>::new(false));
    assert!(shared.is_empty());

    let generation = shared
        .spawn_rebuild(vec![item("A", &["firefox"]), item("B", &["files"])])
        .expect("spawn indexer")
        .join()
        .expect("indexer finished");
    assert_eq!(generation, 1);
    assert_eq!(shared.len(), 2);
    assert_eq!(ids(&shared.search("fi")), ["A", "B"]);

    shared.set_fuzzy(true);
    assert_eq!(ids(&shared.search("firefix")), ["A"]);
}

#[test]
fn readers_keep_their_snapshot_across_a_swap() {
    let shared = SharedIndex::<StandardItem>::new(false);
    shared.rebuild([item("A", &["firefox"])]);
    let before = shared.snapshot();

    shared.rebuild([item("B", &["files"])]);
    assert_eq!(ids(&before.search("fi")), ["A"]);
    assert_eq!(ids(&shared.search("fi")), ["B"]);
    assert_eq!(shared.generation(), 2);
}

#[test]
fn concurrent_searches_during_rebuilds() {
    let shared = Arc::new(SharedIndex::<StandardItem>::new(true));
    shared.rebuild((0..64).map(|n| item(&format!("item{n}"), &["firefox"])));

    thread::scope(|scope| {
        for _ in 0..4 {
            let shared = &shared;
            scope.spawn(move || {
                for _ in 0..50 {
                    let len = shared.search("fire").len();
                    assert!(len == 64 || len == 32, "observed partial index: {len}");
                }
            });
        }
        scope.spawn(|| {
            for round in 0..10 {
                let count = if round % 2 == 0 { 32 } else { 64 };
                shared.rebuild((0..count).map(|n| item(&format!("item{n}"), &["firefox"])));
            }
        });
    });
}

#[test]
fn indexes_trait_objects() {
    let mut index: OfflineIndex<dyn crate::item::Indexable> = OfflineIndex::new();
    index.add(Arc::new(StandardItem::new("A", "Firefox", "apps")));
    let results = index.search("fire");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].text(), "Firefox");
}

fn keyword() -> impl Strategy<Value = String> {
    "[a-f]{1,7}"
}

fn items() -> impl Strategy<Value = Vec<(String, Vec<String>)>> {
    prop::collection::vec(prop::collection::vec(keyword(), 1..4), 0..12).prop_map(|keywords| {
        keywords
            .into_iter()
            .enumerate()
            .map(|(n, keywords)| (format!("item{n}"), keywords))
            .collect()
    })
}

fn build(entries: &[(String, Vec<String>)], fuzzy: bool) -> OfflineIndex<StandardItem> {
    let mut index = OfflineIndex::new();
    index.set_fuzzy(fuzzy);
    for (id, keywords) in entries {
        index.add(Arc::new(
            StandardItem::new(id.as_str(), id.as_str(), "prop").with_keywords(keywords.clone()),
        ));
    }
    index
}

proptest! {
    #[test]
    fn insertion_order_does_not_change_results(
        entries in items(),
        term in "[a-f]{1,5}( [a-f]{1,3})?",
        fuzzy in any::<bool>(),
    ) {
        let forward = build(&entries, fuzzy);
        let mut reversed_entries = entries.clone();
        reversed_entries.reverse();
        let reversed = build(&reversed_entries, fuzzy);

        prop_assert_eq!(ids(&forward.search(&term)), ids(&reversed.search(&term)));
    }

    #[test]
    fn fuzzy_results_contain_exact_results(
        entries in items(),
        term in "[a-f]{1,8}( [a-f]{1,3})?",
    ) {
        let index = build(&entries, false);
        let exact = ids(&index.search_with(&term, false));
        let fuzzy = ids(&index.search_with(&term, true));
        for id in &exact {
            prop_assert!(fuzzy.contains(id), "{} missing from fuzzy results", id);
        }
    }

    #[test]
    fn results_never_contain_duplicates(
        entries in items(),
        term in "[a-f]{1,4}",
    ) {
        let index = build(&entries, true);
        let mut results = ids(&index.search(&term));
        let total = results.len();
        results.dedup();
        prop_assert_eq!(results.len(), total);
    }
}

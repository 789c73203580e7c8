use std::sync::Arc;
use std::thread::JoinHandle;

use flint_plugin_api::{Item, Match, Query, QueryHandler, SharedIndex, StandardItem};
use parking_lot::Mutex;
use serde::Deserialize;
use tracing::{debug, warn};

pub const EXTENSION_ID: &str = "bookmarks";

/// One configured bookmark.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Bookmark {
    pub id: String,
    pub name: String,
    pub target: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl Bookmark {
    fn to_item(&self) -> Arc<StandardItem> {
        let keywords = std::iter::once(self.name.clone()).chain(self.keywords.iter().cloned());
        Arc::new(
            StandardItem::new(format!("{EXTENSION_ID}.{}", self.id), &self.name, EXTENSION_ID)
                .with_subtext(&self.target)
                .with_keywords(keywords),
        )
    }
}

/// Finds bookmarks by name and keywords through an offline index.
///
/// The index is built when the handler is created and rebuilt in the
/// background at the start of every session, so entries swapped in with
/// [`set_entries`](Self::set_entries) show up from the next session on.
pub struct BookmarksHandler {
    entries: Mutex<Vec<Bookmark>>,
    index: Arc<SharedIndex<StandardItem>>,
    trigger: Option<String>,
    indexer: Mutex<Option<JoinHandle<u64>>>,
}

impl BookmarksHandler {
    pub fn new(entries: Vec<Bookmark>) -> Self {
        let index = Arc::new(SharedIndex::new(false));
        index.rebuild(entries.iter().map(Bookmark::to_item));
        Self {
            entries: Mutex::new(entries),
            index,
            trigger: None,
            indexer: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn with_fuzzy(self, fuzzy: bool) -> Self {
        self.index.set_fuzzy(fuzzy);
        self
    }

    /// Route queries starting with `trigger` to this handler only.
    #[must_use]
    pub fn with_trigger(mut self, trigger: Option<String>) -> Self {
        self.trigger = trigger.filter(|trigger| !trigger.is_empty());
        self
    }

    pub fn set_fuzzy(&self, fuzzy: bool) {
        self.index.set_fuzzy(fuzzy);
    }

    /// Replace the configured entries. Takes effect at the next rebuild.
    pub fn set_entries(&self, entries: Vec<Bookmark>) {
        *self.entries.lock() = entries;
    }

    /// Number of bookmarks in the published index.
    pub fn indexed(&self) -> usize {
        self.index.len()
    }

    /// Block until a pending background rebuild has been published.
    pub fn wait_for_index(&self) -> Option<u64> {
        let handle = self.indexer.lock().take()?;
        match handle.join() {
            Ok(generation) => Some(generation),
            Err(_) => {
                warn!("bookmark indexer panicked");
                None
            }
        }
    }
}

impl QueryHandler for BookmarksHandler {
    fn id(&self) -> &str {
        EXTENSION_ID
    }

    fn trigger(&self) -> Option<&str> {
        self.trigger.as_deref()
    }

    fn setup_session(&self) {
        // Rebuilds publish in the order they were started.
        let previous = self.indexer.lock().take();
        if let Some(previous) = previous
            && previous.join().is_err()
        {
            warn!("bookmark indexer panicked");
        }

        let items: Vec<_> = self.entries.lock().iter().map(Bookmark::to_item).collect();
        match self.index.spawn_rebuild(items) {
            Ok(handle) => *self.indexer.lock() = Some(handle),
            Err(err) => warn!(error = %err, "failed to spawn bookmark indexer"),
        }
    }

    fn handle_query(&self, query: &Query) -> anyhow::Result<()> {
        let found = self.index.search(query.search_term());
        debug!(term = query.search_term(), found = found.len(), "bookmark lookup");
        if !query.is_valid() {
            return Ok(());
        }
        query.add_matches(
            found
                .into_iter()
                .map(|item| Match::new(item as Arc<dyn Item>)),
        );
        Ok(())
    }
}

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use tracing::debug;

use super::OfflineIndex;
use crate::item::Indexable;

/// An [`OfflineIndex`] that readers search while a background indexer
/// replaces it.
///
/// Readers load the current index without locking. A rebuild assembles the
/// replacement off to the side and holds the publish lock only for the swap,
/// so searches in flight keep using the index they started with and never see
/// a partially built one.
pub struct SharedIndex<T: ?Sized> {
    current: ArcSwap<OfflineIndex<T>>,
    publish: Mutex<u64>,
    fuzzy: AtomicBool,
}

impl<T: Indexable + ?Sized + 'static> SharedIndex<T> {
    #[must_use]
    pub fn new(fuzzy: bool) -> Self {
        Self {
            current: ArcSwap::from_pointee(OfflineIndex::new()),
            publish: Mutex::new(0),
            fuzzy: AtomicBool::new(fuzzy),
        }
    }

    #[must_use]
    pub fn is_fuzzy(&self) -> bool {
        self.fuzzy.load(Ordering::Relaxed)
    }

    /// Toggle fuzzy matching for subsequent searches.
    pub fn set_fuzzy(&self, fuzzy: bool) {
        self.fuzzy.store(fuzzy, Ordering::Relaxed);
    }

    /// Search the currently published index.
    #[must_use]
    pub fn search(&self, term: &str) -> Vec<Arc<T>> {
        self.current.load().search_with(term, self.is_fuzzy())
    }

    /// The currently published index.
    #[must_use]
    pub fn snapshot(&self) -> Arc<OfflineIndex<T>> {
        self.current.load_full()
    }

    /// Number of items in the published index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.current.load().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// How many indexes have been published so far.
    #[must_use]
    pub fn generation(&self) -> u64 {
        *self.publish.lock()
    }

    /// Build a fresh index from `items` and publish it. Returns the new
    /// generation.
    pub fn rebuild<I>(&self, items: I) -> u64
    where
        I: IntoIterator<Item = Arc<T>>,
    {
        let mut next = OfflineIndex::new();
        for item in items {
            next.add(item);
        }
        self.publish(next)
    }

    /// Publish a fully built index, replacing the current one.
    pub fn publish(&self, index: OfflineIndex<T>) -> u64 {
        let size = index.len();
        let (generation, replaced) = {
            let mut generation = self.publish.lock();
            *generation += 1;
            (*generation, self.current.swap(Arc::new(index)))
        };
        // The old index may be large; let it go outside the lock.
        drop(replaced);
        debug!(items = size, generation, "published offline index");
        generation
    }

    /// Run [`rebuild`](Self::rebuild) on a background thread.
    pub fn spawn_rebuild(self: &Arc<Self>, items: Vec<Arc<T>>) -> io::Result<JoinHandle<u64>> {
        let index = Arc::clone(self);
        thread::Builder::new()
            .name("flint-indexer".into())
            .spawn(move || index.rebuild(items))
    }
}

impl<T: Indexable + ?Sized + 'static> Default for SharedIndex<T> {
    fn default() -> Self {
        Self::new(false)
    }
}

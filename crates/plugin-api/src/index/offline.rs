use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::ops::Bound;
use std::sync::Arc;

use super::fuzzy;
use super::tokenize::tokenize;
use crate::item::Indexable;

type Slot = usize;

/// Inverted index from keyword tokens to items.
///
/// A search term matches an item when every token of the term matches at
/// least one of the item's keyword tokens, either as a case-insensitive prefix
/// or, in fuzzy mode, within a small edit distance. The index attaches no
/// relevance to its results; ranking happens upstream.
///
/// Mutation takes `&mut self`, so an index shared between threads has to be
/// replaced wholesale rather than edited in place. See
/// [`SharedIndex`](super::SharedIndex) for the usual way to publish one.
pub struct OfflineIndex<T: ?Sized> {
    items: Vec<Option<Arc<T>>>,
    slots: HashMap<String, Slot>,
    free: Vec<Slot>,
    postings: BTreeMap<String, BTreeSet<Slot>>,
    fuzzy: bool,
}

impl<T: Indexable + ?Sized> OfflineIndex<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            slots: HashMap::new(),
            free: Vec::new(),
            postings: BTreeMap::new(),
            fuzzy: false,
        }
    }

    #[must_use]
    pub fn is_fuzzy(&self) -> bool {
        self.fuzzy
    }

    pub fn set_fuzzy(&mut self, fuzzy: bool) {
        self.fuzzy = fuzzy;
    }

    /// Number of indexed items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Index `item`. An item whose id is already present replaces the old one,
    /// including its keyword postings.
    pub fn add(&mut self, item: Arc<T>) {
        let tokens = keyword_tokens(item.as_ref());
        let slot = match self.slots.get(item.id()).copied() {
            Some(slot) => {
                if let Some(previous) = self.items[slot].take() {
                    self.unlink(slot, &keyword_tokens(previous.as_ref()));
                }
                slot
            }
            None => {
                let slot = match self.free.pop() {
                    Some(slot) => slot,
                    None => {
                        self.items.push(None);
                        self.items.len() - 1
                    }
                };
                self.slots.insert(item.id().to_string(), slot);
                slot
            }
        };

        for token in tokens {
            self.postings.entry(token).or_default().insert(slot);
        }
        self.items[slot] = Some(item);
    }

    /// Remove the item registered under `id`.
    pub fn remove(&mut self, id: &str) -> Option<Arc<T>> {
        let slot = self.slots.remove(id)?;
        let item = self.items[slot].take()?;
        self.unlink(slot, &keyword_tokens(item.as_ref()));
        self.free.push(slot);
        Some(item)
    }

    /// Drop every item and posting.
    pub fn clear(&mut self) {
        self.items = Vec::new();
        self.slots = HashMap::new();
        self.free = Vec::new();
        self.postings = BTreeMap::new();
    }

    /// Items matching every token of `term`, ordered by id.
    ///
    /// A term without tokens matches nothing.
    #[must_use]
    pub fn search(&self, term: &str) -> Vec<Arc<T>> {
        self.search_with(term, self.fuzzy)
    }

    /// Like [`search`](Self::search) with an explicit matching mode.
    #[must_use]
    pub fn search_with(&self, term: &str, fuzzy: bool) -> Vec<Arc<T>> {
        let tokens = tokenize(term);
        if tokens.is_empty() {
            return Vec::new();
        }

        let mut candidates: Option<BTreeSet<Slot>> = None;
        for token in &tokens {
            let matched = self.slots_matching(token, fuzzy);
            let narrowed = match candidates {
                None => matched,
                Some(current) => current.intersection(&matched).copied().collect(),
            };
            if narrowed.is_empty() {
                return Vec::new();
            }
            candidates = Some(narrowed);
        }

        let mut results: Vec<Arc<T>> = candidates
            .unwrap_or_default()
            .into_iter()
            .filter_map(|slot| self.items.get(slot).and_then(Clone::clone))
            .collect();
        results.sort_by(|a, b| a.id().cmp(b.id()));
        results
    }

    fn slots_matching(&self, token: &str, fuzzy: bool) -> BTreeSet<Slot> {
        let mut matched: BTreeSet<Slot> = self
            .postings
            .range::<str, _>((Bound::Included(token), Bound::Unbounded))
            .take_while(|(key, _)| key.starts_with(token))
            .flat_map(|(_, slots)| slots.iter().copied())
            .collect();

        if !fuzzy {
            return matched;
        }
        let query: Vec<char> = token.chars().collect();
        let Some(max) = fuzzy::threshold(query.len()) else {
            return matched;
        };
        for (key, slots) in &self.postings {
            if key.starts_with(token) {
                continue;
            }
            let key: Vec<char> = key.chars().collect();
            if fuzzy::prefix_distance(&query, &key, max).is_some() {
                matched.extend(slots.iter().copied());
            }
        }
        matched
    }

    fn unlink(&mut self, slot: Slot, tokens: &BTreeSet<String>) {
        for token in tokens {
            if let Some(slots) = self.postings.get_mut(token) {
                slots.remove(&slot);
                if slots.is_empty() {
                    self.postings.remove(token);
                }
            }
        }
    }
}

fn keyword_tokens<T: Indexable + ?Sized>(item: &T) -> BTreeSet<String> {
    item.index_keywords()
        .iter()
        .flat_map(|keyword| tokenize(keyword))
        .collect()
}

impl<T: Indexable + ?Sized> Default for OfflineIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> Clone for OfflineIndex<T> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
            slots: self.slots.clone(),
            free: self.free.clone(),
            postings: self.postings.clone(),
            fuzzy: self.fuzzy,
        }
    }
}

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::item::Item;

/// A single item proposed by an extension for the current query.
#[derive(Clone, Debug)]
pub struct Match {
    pub item: Arc<dyn Item>,
    /// Optional relevance contributed by the handler. Higher sorts first; `0`
    /// leaves ordering entirely to usage history.
    pub score: u16,
}

impl Match {
    #[must_use]
    pub fn new(item: Arc<dyn Item>) -> Self {
        Self { item, score: 0 }
    }

    #[must_use]
    pub fn scored(item: Arc<dyn Item>, score: u16) -> Self {
        Self { item, score }
    }

    /// Identifier of the matched item.
    #[must_use]
    pub fn id(&self) -> &str {
        self.item.id()
    }
}

struct QueryInner {
    search_term: String,
    original_search_term: String,
    valid: Arc<AtomicBool>,
    sink: Mutex<Vec<Match>>,
}

/// The term being searched plus the channel handlers answer through.
///
/// Clones share the validity flag and the match sink. Handlers should poll
/// [`is_valid`](Self::is_valid) during expensive work and stop once it turns
/// false; nothing interrupts them otherwise.
///
/// A query can be [branched](QueryCanceller::branch): branches have their own
/// sink but share validity, so cancelling any of them cancels all.
#[derive(Clone)]
pub struct Query {
    inner: Arc<QueryInner>,
}

/// Owner-side handle of a [`Query`]. Only this handle can invalidate the query
/// or drain its matches.
pub struct QueryCanceller {
    inner: Arc<QueryInner>,
}

impl Query {
    /// Create a query together with the handle that controls it.
    #[must_use]
    pub fn new(
        search_term: impl Into<String>,
        original_search_term: impl Into<String>,
    ) -> (Self, QueryCanceller) {
        let inner = Arc::new(QueryInner {
            search_term: search_term.into(),
            original_search_term: original_search_term.into(),
            valid: Arc::new(AtomicBool::new(true)),
            sink: Mutex::new(Vec::new()),
        });
        let canceller = QueryCanceller {
            inner: Arc::clone(&inner),
        };
        (Self { inner }, canceller)
    }

    /// The term with any trigger prefix removed.
    #[must_use]
    pub fn search_term(&self) -> &str {
        &self.inner.search_term
    }

    /// The text exactly as typed.
    #[must_use]
    pub fn original_search_term(&self) -> &str {
        &self.inner.original_search_term
    }

    /// `false` once the query has been superseded or cancelled.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.inner.valid.load(Ordering::Acquire)
    }

    /// Append a match. Dropped silently if the query is no longer valid.
    pub fn add_match(&self, item: Arc<dyn Item>, score: u16) {
        self.add_matches([Match::scored(item, score)]);
    }

    /// Append several matches under a single lock acquisition.
    pub fn add_matches<I>(&self, matches: I)
    where
        I: IntoIterator<Item = Match>,
    {
        if !self.is_valid() {
            return;
        }
        self.inner.sink.lock().extend(matches);
    }
}

impl QueryCanceller {
    /// A query over the same term with an empty sink of its own.
    pub fn branch(&self) -> (Query, QueryCanceller) {
        self.branch_with(self.inner.search_term.clone())
    }

    /// Like [`branch`](Self::branch) with a different search term. The
    /// original search term is kept.
    pub fn branch_with(&self, search_term: impl Into<String>) -> (Query, QueryCanceller) {
        let inner = Arc::new(QueryInner {
            search_term: search_term.into(),
            original_search_term: self.inner.original_search_term.clone(),
            valid: Arc::clone(&self.inner.valid),
            sink: Mutex::new(Vec::new()),
        });
        let canceller = QueryCanceller {
            inner: Arc::clone(&inner),
        };
        (Query { inner }, canceller)
    }

    /// Flip the query to invalid. Returns `true` only for the call that
    /// performed the transition.
    pub fn cancel(&self) -> bool {
        self.inner.valid.swap(false, Ordering::AcqRel)
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        !self.inner.valid.load(Ordering::Acquire)
    }

    /// Remove and return every match appended so far, in append order.
    pub fn take_matches(&self) -> Vec<Match> {
        std::mem::take(&mut *self.inner.sink.lock())
    }

    /// Number of matches currently in the sink.
    #[must_use]
    pub fn match_count(&self) -> usize {
        self.inner.sink.lock().len()
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("search_term", &self.search_term())
            .field("original_search_term", &self.original_search_term())
            .field("valid", &self.is_valid())
            .finish()
    }
}

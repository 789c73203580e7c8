//! One query's fan-out across handlers, and the merge that follows.

mod pool;

pub(crate) use pool::guarded;

use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;
use std::time::{Duration, Instant};

use flint_plugin_api::{FallbackProvider, Match, Query, QueryCanceller, QueryHandler};
use indexmap::IndexMap;
use parking_lot::{Condvar, Mutex};
use tracing::{debug, warn};

use crate::ranking::MatchRanker;

/// Lifecycle of a [`QueryExecution`]. `Finished` and `Cancelled` are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    Created,
    Running,
    Finished,
    Cancelled,
}

impl ExecutionState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Cancelled)
    }
}

impl fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "created",
            Self::Running => "running",
            Self::Finished => "finished",
            Self::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Ranked matches of a finished execution, sent once per execution.
#[derive(Debug, Clone)]
pub struct QueryResults {
    pub query_id: u64,
    pub search_term: String,
    pub matches: Vec<Match>,
}

/// Everything an execution is built from. The handler and fallback sets are
/// fixed here; later registry changes do not affect a running query.
pub struct ExecutionPlan {
    pub id: u64,
    pub search_term: String,
    pub original_search_term: String,
    pub handlers: Vec<Arc<dyn QueryHandler>>,
    pub fallbacks: Vec<Arc<dyn FallbackProvider>>,
    /// Upper bound on concurrent handler invocations. The pool never exceeds
    /// the handler count or the available parallelism either way.
    pub worker_limit: Option<NonZeroUsize>,
}

struct Shared {
    id: u64,
    query: Query,
    canceller: QueryCanceller,
    handlers: Vec<Arc<dyn QueryHandler>>,
    fallbacks: Vec<Arc<dyn FallbackProvider>>,
    worker_limit: Option<NonZeroUsize>,
    ranker: Arc<MatchRanker>,
    results_tx: Sender<QueryResults>,
    state: Mutex<ExecutionState>,
    settled: Condvar,
    merged: Mutex<Vec<Match>>,
    runtimes: Mutex<HashMap<String, Duration>>,
    ranked: Mutex<Vec<Match>>,
}

/// Handle to one query's execution. Clones refer to the same execution.
#[derive(Clone)]
pub struct QueryExecution {
    shared: Arc<Shared>,
}

impl QueryExecution {
    pub fn new(
        plan: ExecutionPlan,
        ranker: Arc<MatchRanker>,
        results_tx: Sender<QueryResults>,
    ) -> Self {
        let (query, canceller) = Query::new(plan.search_term, plan.original_search_term);
        Self {
            shared: Arc::new(Shared {
                id: plan.id,
                query,
                canceller,
                handlers: plan.handlers,
                fallbacks: plan.fallbacks,
                worker_limit: plan.worker_limit,
                ranker,
                results_tx,
                state: Mutex::new(ExecutionState::Created),
                settled: Condvar::new(),
                merged: Mutex::new(Vec::new()),
                runtimes: Mutex::new(HashMap::new()),
                ranked: Mutex::new(Vec::new()),
            }),
        }
    }

    #[must_use]
    pub fn id(&self) -> u64 {
        self.shared.id
    }

    #[must_use]
    pub fn search_term(&self) -> &str {
        self.shared.query.search_term()
    }

    #[must_use]
    pub fn original_search_term(&self) -> &str {
        self.shared.query.original_search_term()
    }

    #[must_use]
    pub fn state(&self) -> ExecutionState {
        *self.shared.state.lock()
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.shared.query.is_valid()
    }

    /// Start the execution on a coordinator thread. Has no effect unless the
    /// execution is still `Created`.
    pub fn run(&self) {
        {
            let mut state = self.shared.state.lock();
            if *state != ExecutionState::Created {
                return;
            }
            *state = ExecutionState::Running;
        }
        debug!(
            query_id = self.shared.id,
            term = self.shared.query.original_search_term(),
            handlers = self.shared.handlers.len(),
            "query started"
        );

        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name(format!("flint-query-{}", self.shared.id))
            .spawn(move || shared.execute());
        if let Err(err) = spawned {
            warn!(query_id = self.shared.id, error = %err, "failed to spawn query thread; running inline");
            self.shared.execute();
        }
    }

    /// Invalidate the query. A `Created` execution is cancelled on the spot; a
    /// running one settles as `Cancelled` once its handlers return.
    pub fn cancel(&self) {
        let mut state = self.shared.state.lock();
        if state.is_terminal() {
            return;
        }
        self.shared.canceller.cancel();
        if *state == ExecutionState::Created {
            *state = ExecutionState::Cancelled;
            drop(state);
            self.shared.settled.notify_all();
        }
    }

    /// Block until the execution reaches a terminal state.
    pub fn wait(&self) -> ExecutionState {
        let mut state = self.shared.state.lock();
        while !state.is_terminal() {
            self.shared.settled.wait(&mut state);
        }
        *state
    }

    /// Like [`wait`](Self::wait) but gives up after `timeout`, returning the
    /// state observed at that point.
    pub fn wait_timeout(&self, timeout: Duration) -> ExecutionState {
        let deadline = Instant::now() + timeout;
        let mut state = self.shared.state.lock();
        while !state.is_terminal() {
            if self
                .shared
                .settled
                .wait_until(&mut state, deadline)
                .timed_out()
            {
                break;
            }
        }
        *state
    }

    /// Elapsed wall time of every handler invocation that has returned.
    #[must_use]
    pub fn runtimes(&self) -> HashMap<String, Duration> {
        self.shared.runtimes.lock().clone()
    }

    /// The ranked matches. Empty unless the execution finished.
    #[must_use]
    pub fn matches(&self) -> Vec<Match> {
        self.shared.ranked.lock().clone()
    }
}

impl fmt::Debug for QueryExecution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryExecution")
            .field("id", &self.shared.id)
            .field("term", &self.shared.query.original_search_term())
            .field("state", &self.state())
            .finish()
    }
}

impl Shared {
    fn execute(&self) {
        let started = Instant::now();
        pool::run_handlers(self);

        if !self.fallbacks.is_empty() && self.query.is_valid() && self.merged.lock().is_empty() {
            self.run_fallbacks();
        }

        self.settle(started.elapsed());
    }

    fn run_fallbacks(&self) {
        let raw = self.query.original_search_term().to_string();
        for provider in &self.fallbacks {
            let (query, canceller) = self.canceller.branch_with(raw.clone());
            let outcome = pool::guarded(provider.id(), || provider.handle_fallback_query(&query));
            if outcome.is_ok() {
                self.merged.lock().extend(canceller.take_matches());
            }
        }
    }

    fn record(&self, handler_id: &str, elapsed: Duration, matches: Option<Vec<Match>>) {
        self.runtimes.lock().insert(handler_id.to_string(), elapsed);
        if let Some(matches) = matches {
            self.merged.lock().extend(matches);
        }
    }

    fn settle(&self, elapsed: Duration) {
        let mut state = self.state.lock();
        if !self.query.is_valid() {
            *state = ExecutionState::Cancelled;
            drop(state);
            self.settled.notify_all();
            debug!(query_id = self.id, ?elapsed, "query cancelled");
            return;
        }

        let mut matches = dedupe(std::mem::take(&mut *self.merged.lock()));
        self.ranker.sort(&mut matches);
        *self.ranked.lock() = matches.clone();
        *state = ExecutionState::Finished;

        let count = matches.len();
        let results = QueryResults {
            query_id: self.id,
            search_term: self.query.original_search_term().to_string(),
            matches,
        };
        if self.results_tx.send(results).is_err() {
            debug!(query_id = self.id, "results receiver dropped");
        }
        drop(state);
        self.settled.notify_all();
        debug!(query_id = self.id, matches = count, ?elapsed, "query finished");
    }
}

/// Collapse matches sharing an item id. The last contribution wins but keeps
/// the position of the first.
fn dedupe(matches: Vec<Match>) -> Vec<Match> {
    let mut unique: IndexMap<String, Match> = IndexMap::with_capacity(matches.len());
    for matched in matches {
        unique.insert(matched.id().to_string(), matched);
    }
    unique.into_values().collect()
}

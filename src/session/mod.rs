//! Session lifecycle and query supersession.
//!
//! A [`SessionController`] lives on the thread that talks to the user. Every
//! keystroke goes through [`start_query`](SessionController::start_query),
//! which cancels the previous execution and parks it until the session is torn
//! down. Teardown persists what the parked executions measured and refreshes
//! the ranking for the next session.

mod routing;

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};

use chrono::Utc;
use flint_plugin_api::{PluginRegistry, QueryHandler};
use tracing::{debug, warn};

use crate::execution::{self, ExecutionPlan, ExecutionState, QueryExecution, QueryResults};
use crate::ranking::MatchRanker;
use crate::store::{RuntimeRecord, UsageRecord, UsageStore};

/// What a teardown did with the parked executions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeardownReport {
    /// Executions drained from the past list.
    pub drained: usize,
    /// Runtime records handed to the store.
    pub runtimes: usize,
    /// Executions left behind because their handlers are still running.
    pub retained: usize,
}

pub struct SessionController {
    registry: PluginRegistry,
    ranker: Arc<MatchRanker>,
    results_tx: Sender<QueryResults>,
    worker_limit: Option<NonZeroUsize>,
    current: Option<QueryExecution>,
    past: Vec<QueryExecution>,
    next_id: u64,
}

impl SessionController {
    /// Create a controller and load the initial ranking. A store that cannot be
    /// read leaves the ranking empty.
    pub fn new(
        registry: PluginRegistry,
        ranker: Arc<MatchRanker>,
        results_tx: Sender<QueryResults>,
    ) -> Self {
        if let Err(err) = ranker.refresh() {
            warn!(error = %err, "failed to load usage history");
        }
        Self {
            registry,
            ranker,
            results_tx,
            worker_limit: None,
            current: None,
            past: Vec::new(),
            next_id: 1,
        }
    }

    /// Cap the number of threads one query may use.
    #[must_use]
    pub fn with_worker_limit(mut self, limit: Option<NonZeroUsize>) -> Self {
        self.worker_limit = limit;
        self
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut PluginRegistry {
        &mut self.registry
    }

    pub fn ranker(&self) -> &Arc<MatchRanker> {
        &self.ranker
    }

    /// The execution started by the latest keystroke.
    pub fn current(&self) -> Option<&QueryExecution> {
        self.current.as_ref()
    }

    /// Superseded executions awaiting teardown.
    pub fn past(&self) -> &[QueryExecution] {
        &self.past
    }

    /// Call every handler's setup hook.
    pub fn setup_session(&self) {
        let started = Instant::now();
        for handler in self.registry.query_handlers() {
            let elapsed = timed_hook(handler.as_ref(), |handler| handler.setup_session());
            debug!(handler = handler.id(), micros = micros(elapsed), "session setup");
        }
        debug!(micros = micros(started.elapsed()), "session set up");
    }

    /// Cancel the running query, call every handler's teardown hook, persist
    /// the runtimes of settled executions and refresh the ranking.
    pub fn teardown_session(&mut self) -> TeardownReport {
        let started = Instant::now();
        self.park_current();

        for handler in self.registry.query_handlers() {
            let elapsed = timed_hook(handler.as_ref(), |handler| handler.teardown_session());
            debug!(handler = handler.id(), micros = micros(elapsed), "session teardown");
        }

        let report = self.drain_past();
        if let Err(err) = self.ranker.refresh() {
            warn!(error = %err, "failed to refresh match ranking");
        }
        debug!(
            micros = micros(started.elapsed()),
            drained = report.drained,
            retained = report.retained,
            "session torn down"
        );
        report
    }

    /// Supersede the current execution with one for `term`.
    ///
    /// Returns `None` when no extension is registered; the previous execution
    /// is cancelled either way.
    pub fn start_query(&mut self, term: &str) -> Option<QueryExecution> {
        self.park_current();

        let handlers = self.registry.query_handlers();
        let fallbacks = self.registry.fallback_providers();
        if handlers.is_empty() && fallbacks.is_empty() {
            debug!("no extensions registered; ignoring query");
            return None;
        }

        let routed = routing::route(handlers, term);
        let id = self.next_id;
        self.next_id += 1;

        let execution = QueryExecution::new(
            ExecutionPlan {
                id,
                search_term: routed.search_term,
                original_search_term: term.to_string(),
                handlers: routed.handlers,
                fallbacks,
                worker_limit: self.worker_limit,
            },
            Arc::clone(&self.ranker),
            self.results_tx.clone(),
        );
        execution.run();
        self.current = Some(execution.clone());
        Some(execution)
    }

    /// Remember that `item_id` was chosen for `term`. Failures are logged only.
    pub fn record_activation(&self, term: &str, item_id: &str) {
        let record = UsageRecord::now(term, item_id);
        match self.ranker.store().append_usage(&record) {
            Ok(()) => debug!(item = item_id, "recorded activation"),
            Err(err) => warn!(item = item_id, error = %err, "failed to record activation"),
        }
    }

    fn park_current(&mut self) {
        if let Some(current) = self.current.take() {
            current.cancel();
            self.past.push(current);
        }
    }

    fn drain_past(&mut self) -> TeardownReport {
        let timestamp = Utc::now();
        let mut records = Vec::new();
        let mut drained = 0;
        self.past.retain(|execution| {
            if execution.state() == ExecutionState::Running {
                return true;
            }
            drained += 1;
            let mut runtimes: Vec<_> = execution.runtimes().into_iter().collect();
            runtimes.sort();
            records.extend(runtimes.into_iter().map(|(handler_id, elapsed)| RuntimeRecord {
                handler_id,
                elapsed_micros: micros(elapsed),
                timestamp,
            }));
            false
        });

        if !records.is_empty()
            && let Err(err) = self.ranker.store().append_runtimes(&records)
        {
            warn!(records = records.len(), error = %err, "failed to persist handler runtimes");
        }

        TeardownReport {
            drained,
            runtimes: records.len(),
            retained: self.past.len(),
        }
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        if let Some(current) = &self.current {
            current.cancel();
        }
        for execution in &self.past {
            execution.cancel();
        }
    }
}

fn timed_hook<F>(handler: &dyn QueryHandler, hook: F) -> Duration
where
    F: FnOnce(&dyn QueryHandler),
{
    let started = Instant::now();
    let _ = execution::guarded(handler.id(), || {
        hook(handler);
        Ok(())
    });
    started.elapsed()
}

fn micros(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX)
}

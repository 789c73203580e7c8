use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use flint::plugin_api::{Match, PluginRegistry};
use flint::{
    ExecutionState, MatchRanker, MemoryStore, QueryResults, RuntimeSummary, SessionController,
    SqliteStore, TeardownReport, UsageStore,
};
use flint_plugins_bookmarks::BookmarksHandler;
use flint_plugins_websearch::WebSearch;
use tracing::{debug, warn};

use crate::settings::{ResolvedConfig, StorageLocation};

/// One ranked match as printed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MatchRow {
    pub(crate) id: String,
    pub(crate) text: String,
    pub(crate) subtext: String,
    pub(crate) extension: String,
    pub(crate) score: u16,
}

impl From<&Match> for MatchRow {
    fn from(matched: &Match) -> Self {
        Self {
            id: matched.id().to_string(),
            text: matched.item.text().to_string(),
            subtext: matched.item.subtext().to_string(),
            extension: matched.item.extension_id().to_string(),
            score: matched.score,
        }
    }
}

#[derive(Debug)]
pub(crate) enum Outcome {
    Query {
        term: String,
        query_id: u64,
        state: ExecutionState,
        matches: Vec<MatchRow>,
        teardown: TeardownReport,
    },
    Activation {
        term: String,
        item_id: String,
        rank: Option<usize>,
    },
    Stats {
        runtimes: Vec<RuntimeSummary>,
        top: Vec<(String, f64)>,
    },
    NoExtensions,
}

/// Runs one launcher session per invocation of the binary.
pub(crate) struct LauncherWorkflow {
    session: SessionController,
    results: Receiver<QueryResults>,
}

impl LauncherWorkflow {
    pub(crate) fn from_config(config: ResolvedConfig) -> Result<Self> {
        SessionFactory::build(config)
    }

    /// Feed `terms` as successive keystrokes and collect the results of the
    /// last one.
    pub(crate) fn query(mut self, terms: &[String], timeout: Duration) -> Result<Outcome> {
        self.session.setup_session();

        let mut last = None;
        for term in terms {
            last = self.session.start_query(term);
        }
        let Some(execution) = last else {
            self.session.teardown_session();
            return Ok(Outcome::NoExtensions);
        };

        let state = execution.wait_timeout(timeout);
        if !state.is_terminal() {
            execution.cancel();
            self.session.teardown_session();
            bail!(
                "query '{}' did not finish within {} ms",
                execution.original_search_term(),
                timeout.as_millis()
            );
        }

        let matches = match take_results(&self.results, execution.id()) {
            Some(results) => results.matches.iter().map(MatchRow::from).collect(),
            None => {
                debug!(query_id = execution.id(), %state, "no results emitted");
                Vec::new()
            }
        };
        let teardown = self.session.teardown_session();

        Ok(Outcome::Query {
            term: execution.original_search_term().to_string(),
            query_id: execution.id(),
            state,
            matches,
            teardown,
        })
    }

    pub(crate) fn activate(self, term: &str, item_id: &str) -> Result<Outcome> {
        self.session.record_activation(term, item_id);
        let ranker = self.session.ranker();
        ranker.refresh().context("failed to refresh ranking")?;
        Ok(Outcome::Activation {
            term: term.to_string(),
            item_id: item_id.to_string(),
            rank: ranker.snapshot().position(item_id),
        })
    }

    pub(crate) fn stats(self, top: usize) -> Result<Outcome> {
        let ranker = self.session.ranker();
        let runtimes = ranker
            .store()
            .runtime_summary()
            .context("failed to read handler runtimes")?;
        let top = ranker
            .snapshot()
            .entries()
            .take(top)
            .map(|(id, weight)| (id.to_string(), weight))
            .collect();
        Ok(Outcome::Stats { runtimes, top })
    }
}

/// Drain every pending event and keep the one for `query_id`. Results are sent
/// before the execution is marked settled, so they are already queued.
fn take_results(results: &Receiver<QueryResults>, query_id: u64) -> Option<QueryResults> {
    results
        .try_iter()
        .filter(|event| event.query_id == query_id)
        .last()
}

/// Translates resolved configuration into a ready session.
struct SessionFactory {
    config: ResolvedConfig,
    registry: PluginRegistry,
}

impl SessionFactory {
    fn build(config: ResolvedConfig) -> Result<LauncherWorkflow> {
        let factory = Self {
            config,
            registry: PluginRegistry::empty(),
        }
        .with_bookmarks()?
        .with_websearch()?;
        factory.finish()
    }

    fn with_bookmarks(mut self) -> Result<Self> {
        let bookmarks = &self.config.bookmarks;
        if bookmarks.entries.is_empty() {
            return Ok(self);
        }
        let handler = BookmarksHandler::new(bookmarks.entries.clone())
            .with_fuzzy(bookmarks.fuzzy)
            .with_trigger(bookmarks.trigger.clone());
        self.registry
            .register_handler(handler)
            .context("failed to register bookmarks")?;
        Ok(self)
    }

    fn with_websearch(mut self) -> Result<Self> {
        if self.config.websearch.is_empty() {
            return Ok(self);
        }
        let websearch = WebSearch::new(self.config.websearch.clone());
        self.registry
            .register_bundle(&websearch)
            .context("failed to register web search")?;
        Ok(self)
    }

    fn finish(self) -> Result<LauncherWorkflow> {
        let store = open_store(&self.config.storage);
        let ranker = Arc::new(MatchRanker::new(store, self.config.ranking_options()));
        let (tx, results) = mpsc::channel();
        let session = SessionController::new(self.registry, ranker, tx)
            .with_worker_limit(self.config.worker_limit());
        Ok(LauncherWorkflow { session, results })
    }
}

/// Open the configured store. A database that cannot be opened degrades to
/// history kept for this run only.
fn open_store(location: &StorageLocation) -> Arc<dyn UsageStore> {
    match location {
        StorageLocation::InMemory => Arc::new(MemoryStore::new()),
        StorageLocation::Sqlite(path) => match SqliteStore::open(path) {
            Ok(store) => Arc::new(store),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to open usage database; history will not persist");
                Arc::new(MemoryStore::new())
            }
        },
    }
}

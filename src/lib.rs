//! Query orchestration and usage-ranked search for a desktop quick launcher.
//!
//! A [`SessionController`] fans every keystroke out to the registered
//! extensions through a [`QueryExecution`], merges what they find and orders it
//! with a [`MatchRanker`] that learns from past activations kept in a
//! [`UsageStore`].

pub mod app_dirs;
pub mod execution;
pub mod logging;
pub mod ranking;
pub mod session;
pub mod store;

pub use execution::{ExecutionPlan, ExecutionState, QueryExecution, QueryResults};
pub use ranking::{MatchRanker, RankSnapshot, RankingOptions};
pub use session::{SessionController, TeardownReport};
pub use store::{
    CleanupReport, MemoryStore, RuntimeRecord, RuntimeSummary, SqliteStore, StoreError,
    UsageRecord, UsageStore,
};

pub use flint_plugin_api as plugin_api;

use std::num::NonZeroUsize;
use std::path::PathBuf;

use chrono::TimeDelta;
use flint::RankingOptions;
use flint_plugins_bookmarks::Bookmark;
use flint_plugins_websearch::SearchEngine;

mod errors;
mod sources;
mod summary;
mod validation;

pub(crate) use errors::ConfigError;
pub(crate) use sources::{ConfigSources, SettingSource};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Where usage history is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageLocation {
    InMemory,
    Sqlite(PathBuf),
}

#[derive(Debug, Clone, Default)]
pub struct BookmarkSettings {
    pub fuzzy: bool,
    pub trigger: Option<String>,
    pub entries: Vec<Bookmark>,
}

/// Application-ready configuration derived from user input, config files and
/// defaults.
#[derive(Debug)]
pub struct ResolvedConfig {
    pub worker_threads: Option<usize>,
    pub half_life_days: f64,
    pub window_days: i64,
    pub storage: StorageLocation,
    pub bookmarks: BookmarkSettings,
    pub websearch: Vec<SearchEngine>,
}

impl ResolvedConfig {
    pub(super) fn validate(&self, sources: &ConfigSources) -> Result<(), ConfigError> {
        validation::validate(self, sources)
    }

    /// Ranking tuning in the units the ranker works with.
    pub fn ranking_options(&self) -> RankingOptions {
        let half_life = (self.half_life_days * SECONDS_PER_DAY).round() as i64;
        RankingOptions {
            half_life: TimeDelta::try_seconds(half_life).unwrap_or(TimeDelta::MAX),
            window: TimeDelta::try_days(self.window_days).unwrap_or(TimeDelta::MAX),
        }
    }

    /// Thread cap for one query; `None` lets the pool size itself.
    pub fn worker_limit(&self) -> Option<NonZeroUsize> {
        self.worker_threads.and_then(NonZeroUsize::new)
    }

    /// Print a human readable summary of the effective configuration.
    pub fn print_summary(&self) {
        summary::print_summary(self);
    }

    /// Defaults with nothing registered.
    #[cfg(test)]
    pub(crate) fn default_with(storage: StorageLocation) -> Self {
        Self {
            worker_threads: None,
            half_life_days: 14.0,
            window_days: 90,
            storage,
            bookmarks: BookmarkSettings::default(),
            websearch: Vec::new(),
        }
    }
}

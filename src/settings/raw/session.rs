use std::path::PathBuf;

use flint::app_dirs;
use serde::Deserialize;
use tracing::warn;

use crate::cli::CliArgs;

use super::super::resolved::StorageLocation;

pub(super) const DEFAULT_HALF_LIFE_DAYS: f64 = 14.0;
pub(super) const DEFAULT_WINDOW_DAYS: i64 = flint::store::USAGE_RETENTION_DAYS;
const DATABASE_FILE: &str = "core.db";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(super) struct SessionSection {
    pub(super) worker_threads: Option<usize>,
}

impl SessionSection {
    pub(super) fn apply_cli_overrides(&mut self, cli: &CliArgs) {
        if let Some(value) = cli.workers {
            self.worker_threads = Some(value);
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(super) struct RankingSection {
    pub(super) half_life_days: Option<f64>,
    pub(super) window_days: Option<i64>,
}

impl RankingSection {
    pub(super) fn resolve(&self) -> (f64, i64) {
        (
            self.half_life_days.unwrap_or(DEFAULT_HALF_LIFE_DAYS),
            self.window_days.unwrap_or(DEFAULT_WINDOW_DAYS),
        )
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(super) struct StorageSection {
    pub(super) database: Option<PathBuf>,
    pub(super) in_memory: Option<bool>,
}

impl StorageSection {
    pub(super) fn apply_cli_overrides(&mut self, cli: &CliArgs) {
        if let Some(path) = cli.database.clone() {
            self.database = Some(path);
        }
        if cli.in_memory {
            self.in_memory = Some(true);
        }
    }

    /// Pick the usage store. Without an explicit database the history lives in
    /// the cache directory.
    pub(super) fn resolve(self) -> StorageLocation {
        if self.in_memory.unwrap_or(false) {
            return StorageLocation::InMemory;
        }
        if let Some(path) = self.database {
            return StorageLocation::Sqlite(path);
        }
        match app_dirs::get_cache_dir() {
            Ok(dir) => StorageLocation::Sqlite(dir.join(DATABASE_FILE)),
            Err(err) => {
                warn!(error = %err, "no cache directory; usage history will not persist");
                StorageLocation::InMemory
            }
        }
    }
}

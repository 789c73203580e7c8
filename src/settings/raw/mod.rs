use std::env;

use anyhow::{Error, Result};
use serde::Deserialize;

use crate::cli::CliArgs;

use super::resolved::{ConfigSources, ResolvedConfig, SettingSource};

mod extensions;
mod session;

use extensions::{BookmarksSection, WebsearchSection};
use session::{RankingSection, SessionSection, StorageSection};

/// Mirror of the configuration file representation before CLI overrides and
/// validation are applied.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(super) struct RawConfig {
    session: SessionSection,
    ranking: RankingSection,
    storage: StorageSection,
    bookmarks: BookmarksSection,
    websearch: WebsearchSection,
}

impl RawConfig {
    /// Apply CLI overrides on top of the raw configuration values.
    pub(super) fn apply_cli_overrides(&mut self, cli: &CliArgs) {
        self.session.apply_cli_overrides(cli);
        self.storage.apply_cli_overrides(cli);
        self.bookmarks.apply_cli_overrides(cli);
    }

    /// Convert the raw configuration into a [`ResolvedConfig`], validating and
    /// filling defaults where required.
    pub(super) fn resolve(self, cli: &CliArgs) -> Result<ResolvedConfig> {
        let sources = ConfigSources {
            session_worker_threads: detect_source(
                cli.workers.is_some().then_some("--workers"),
                self.session.worker_threads.is_some(),
                "FLINT__SESSION__WORKER_THREADS",
                "session.worker_threads",
            ),
            ranking_half_life_days: detect_source(
                None,
                self.ranking.half_life_days.is_some(),
                "FLINT__RANKING__HALF_LIFE_DAYS",
                "ranking.half_life_days",
            ),
            ranking_window_days: detect_source(
                None,
                self.ranking.window_days.is_some(),
                "FLINT__RANKING__WINDOW_DAYS",
                "ranking.window_days",
            ),
        };

        let (half_life_days, window_days) = self.ranking.resolve();
        let config = ResolvedConfig {
            worker_threads: self.session.worker_threads,
            half_life_days,
            window_days,
            storage: self.storage.resolve(),
            bookmarks: self.bookmarks.resolve(),
            websearch: self.websearch.resolve(),
        };

        config.validate(&sources).map_err(Error::new)?;

        Ok(config)
    }
}

/// Work out where a setting came from. `cli_flag` is the flag name when it was
/// given on the command line.
fn detect_source(
    cli_flag: Option<&'static str>,
    value_present: bool,
    env_var: &'static str,
    key: &'static str,
) -> Option<SettingSource> {
    if !value_present {
        return None;
    }

    if let Some(flag) = cli_flag {
        return Some(SettingSource::CliFlag(flag));
    }

    if env::var_os(env_var).is_some() {
        return Some(SettingSource::Environment(env_var));
    }

    Some(SettingSource::ConfigKey(key))
}

use flint_plugins_bookmarks::Bookmark;
use flint_plugins_websearch::{SearchEngine, default_engines};
use serde::Deserialize;

use crate::cli::CliArgs;

use super::super::resolved::BookmarkSettings;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(super) struct BookmarksSection {
    pub(super) fuzzy: Option<bool>,
    pub(super) trigger: Option<String>,
    pub(super) entries: Vec<Bookmark>,
}

impl BookmarksSection {
    pub(super) fn apply_cli_overrides(&mut self, cli: &CliArgs) {
        if let Some(value) = cli.fuzzy {
            self.fuzzy = Some(value);
        }
    }

    pub(super) fn resolve(self) -> BookmarkSettings {
        BookmarkSettings {
            fuzzy: self.fuzzy.unwrap_or(false),
            trigger: self
                .trigger
                .filter(|trigger| !trigger.trim().is_empty()),
            entries: self.entries,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(super) struct WebsearchSection {
    pub(super) enabled: Option<bool>,
    pub(super) engines: Option<Vec<SearchEngine>>,
}

impl WebsearchSection {
    /// Engines to offer. Unset means the built-in list; disabled means none.
    pub(super) fn resolve(self) -> Vec<SearchEngine> {
        if !self.enabled.unwrap_or(true) {
            return Vec::new();
        }
        self.engines.unwrap_or_else(default_engines)
    }
}

use std::collections::HashSet;

use super::{ConfigError, ConfigSources, ResolvedConfig, SettingSource};

/// Longest history horizon accepted for either ranking duration.
const MAX_DAYS: f64 = 36_500.0;

pub(super) fn validate(config: &ResolvedConfig, sources: &ConfigSources) -> Result<(), ConfigError> {
    if let Some(threads) = config.worker_threads
        && threads == 0
    {
        return Err(ConfigError::invalid(
            "session.worker_threads",
            threads.to_string(),
            sources.source_for_worker_threads(),
            "must be greater than zero",
        ));
    }

    let half_life = config.half_life_days;
    if !half_life.is_finite() || half_life <= 0.0 || half_life > MAX_DAYS {
        return Err(ConfigError::invalid(
            "ranking.half_life_days",
            half_life.to_string(),
            sources.source_for_half_life(),
            format!("must be greater than zero and at most {MAX_DAYS}"),
        ));
    }

    let window = config.window_days;
    if window <= 0 || window as f64 > MAX_DAYS {
        return Err(ConfigError::invalid(
            "ranking.window_days",
            window.to_string(),
            sources.source_for_window(),
            format!("must be greater than zero and at most {MAX_DAYS}"),
        ));
    }

    let mut ids = HashSet::new();
    for bookmark in &config.bookmarks.entries {
        if bookmark.id.trim().is_empty() {
            return Err(ConfigError::invalid(
                "bookmarks.entries",
                bookmark.name.clone(),
                SettingSource::ConfigKey("bookmarks.entries"),
                "every bookmark needs an id",
            ));
        }
        if !ids.insert(bookmark.id.as_str()) {
            return Err(ConfigError::invalid(
                "bookmarks.entries",
                bookmark.id.clone(),
                SettingSource::ConfigKey("bookmarks.entries"),
                "bookmark ids must be unique",
            ));
        }
    }

    let mut engine_ids = HashSet::new();
    for engine in &config.websearch {
        if !engine_ids.insert(engine.item_id()) {
            return Err(ConfigError::invalid(
                "websearch.engines",
                engine.name.clone(),
                SettingSource::ConfigKey("websearch.engines"),
                "engine names must be unique ignoring case",
            ));
        }
        if !engine.url.contains("%s") {
            return Err(ConfigError::invalid(
                "websearch.engines",
                engine.url.clone(),
                SettingSource::ConfigKey("websearch.engines"),
                format!("url for {} has no %s placeholder", engine.name),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use flint_plugins_bookmarks::Bookmark;
    use flint_plugins_websearch::SearchEngine;

    use super::super::StorageLocation;
    use super::*;

    fn config() -> ResolvedConfig {
        ResolvedConfig::default_with(StorageLocation::InMemory)
    }

    fn bookmark(id: &str) -> Bookmark {
        Bookmark {
            id: id.into(),
            name: "Name".into(),
            target: "https://example.org".into(),
            keywords: Vec::new(),
        }
    }

    #[test]
    fn defaults_are_valid() {
        validate(&config(), &ConfigSources::default()).expect("defaults");
    }

    #[test]
    fn validation_rejects_zero_workers() {
        let config = ResolvedConfig {
            worker_threads: Some(0),
            ..config()
        };
        let sources = ConfigSources {
            session_worker_threads: Some(SettingSource::CliFlag("--workers")),
            ..ConfigSources::default()
        };

        let err = validate(&config, &sources).expect_err("zero workers");
        assert_eq!(err.key, "session.worker_threads");
        let message = err.to_string();
        assert!(message.contains("value: 0"));
        assert!(message.contains("CLI flag `--workers`"));
    }

    #[test]
    fn validation_rejects_non_positive_half_life() {
        let config = ResolvedConfig {
            half_life_days: 0.0,
            ..config()
        };
        let sources = ConfigSources {
            ranking_half_life_days: Some(SettingSource::Environment(
                "FLINT__RANKING__HALF_LIFE_DAYS",
            )),
            ..ConfigSources::default()
        };

        let err = validate(&config, &sources).expect_err("zero half life");
        assert_eq!(err.key, "ranking.half_life_days");
        assert!(err.to_string().contains("environment variable"));
    }

    #[test]
    fn validation_rejects_empty_window() {
        let config = ResolvedConfig {
            window_days: -3,
            ..config()
        };
        let err = validate(&config, &ConfigSources::default()).expect_err("negative window");
        assert_eq!(err.key, "ranking.window_days");
        assert_eq!(err.origin, SettingSource::ConfigKey("ranking.window_days"));
    }

    #[test]
    fn validation_rejects_duplicate_bookmark_ids() {
        let mut config = config();
        config.bookmarks.entries = vec![bookmark("mail"), bookmark("mail")];
        let err = validate(&config, &ConfigSources::default()).expect_err("duplicate");
        assert_eq!(err.key, "bookmarks.entries");
        assert!(err.to_string().contains("unique"));

        config.bookmarks.entries = vec![bookmark(" ")];
        let err = validate(&config, &ConfigSources::default()).expect_err("blank id");
        assert!(err.to_string().contains("needs an id"));
    }

    #[test]
    fn validation_rejects_engines_without_placeholder() {
        let config = ResolvedConfig {
            websearch: vec![SearchEngine::new("Broken", "https://example.org/search")],
            ..config()
        };
        let err = validate(&config, &ConfigSources::default()).expect_err("no placeholder");
        assert_eq!(err.key, "websearch.engines");
        assert!(err.to_string().contains("Broken"));
    }

    #[test]
    fn validation_rejects_engine_names_equal_ignoring_case() {
        let config = ResolvedConfig {
            websearch: vec![
                SearchEngine::new("Search", "https://one.example/?q=%s"),
                SearchEngine::new("search", "https://two.example/?q=%s"),
            ],
            ..config()
        };
        let err = validate(&config, &ConfigSources::default()).expect_err("duplicate engine");
        assert_eq!(err.key, "websearch.engines");
        let message = err.to_string();
        assert!(message.contains("unique ignoring case"));
        assert!(message.contains("value: search"));
    }
}

use super::{ResolvedConfig, StorageLocation};

pub(super) fn print_summary(config: &ResolvedConfig) {
    println!("Effective configuration:");
    match config.worker_threads {
        Some(threads) => println!("  Worker threads: {threads}"),
        None => println!("  Worker threads: automatic"),
    }
    println!("  Ranking half-life: {} days", config.half_life_days);
    println!("  Ranking window: {} days", config.window_days);
    match &config.storage {
        StorageLocation::InMemory => println!("  Usage history: in memory"),
        StorageLocation::Sqlite(path) => println!("  Usage history: {}", path.display()),
    }
    println!("  Bookmarks: {}", config.bookmarks.entries.len());
    println!("  Fuzzy bookmarks: {}", bool_to_word(config.bookmarks.fuzzy));
    if let Some(trigger) = &config.bookmarks.trigger {
        println!("  Bookmark trigger: {trigger:?}");
    }
    if config.websearch.is_empty() {
        println!("  Web search: disabled");
    } else {
        let engines: Vec<&str> = config
            .websearch
            .iter()
            .map(|engine| engine.name.as_str())
            .collect();
        println!("  Web search: {}", engines.join(", "));
    }
}

fn bool_to_word(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_to_word_matches_expectations() {
        assert_eq!(bool_to_word(true), "yes");
        assert_eq!(bool_to_word(false), "no");
    }

    #[test]
    fn summary_prints_without_panic() {
        let mut config = ResolvedConfig::default_with(StorageLocation::Sqlite("/tmp/core.db".into()));
        config.worker_threads = Some(2);
        config.bookmarks.trigger = Some("bm ".into());
        config.websearch = flint_plugins_websearch::default_engines();
        print_summary(&config);
    }
}

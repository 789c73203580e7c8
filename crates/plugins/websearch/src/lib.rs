use std::collections::HashSet;
use std::sync::Arc;

use flint_plugin_api::{
    Capability, FallbackProvider, Item, PluginBundle, Query, QueryHandler, StandardItem,
};
use serde::Deserialize;
use tracing::warn;

pub const EXTENSION_ID: &str = "websearch";

/// A search engine reachable through a URL template.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchEngine {
    pub name: String,
    /// URL with `%s` where the percent-encoded term goes.
    pub url: String,
    #[serde(default)]
    pub trigger: Option<String>,
}

impl SearchEngine {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            trigger: None,
        }
    }

    #[must_use]
    pub fn with_trigger(mut self, trigger: impl Into<String>) -> Self {
        self.trigger = Some(trigger.into());
        self
    }

    /// The URL that searches this engine for `term`.
    pub fn url_for(&self, term: &str) -> String {
        self.url.replace("%s", &urlencoding::encode(term))
    }

    /// Id of the items this engine yields. Names differing only in case
    /// share one.
    pub fn item_id(&self) -> String {
        format!("{EXTENSION_ID}.{}", self.name.to_lowercase())
    }

    fn item(&self, term: &str) -> Arc<dyn Item> {
        Arc::new(
            StandardItem::new(
                self.item_id(),
                format!("Search for '{term}' in {}", self.name),
                EXTENSION_ID,
            )
            .with_subtext(self.url_for(term)),
        )
    }
}

/// Engines used when none are configured.
pub fn default_engines() -> Vec<SearchEngine> {
    vec![
        SearchEngine::new("Google", "https://www.google.com/search?q=%s").with_trigger("gg "),
        SearchEngine::new("Wikipedia", "https://en.wikipedia.org/w/index.php?search=%s")
            .with_trigger("wp "),
        SearchEngine::new("YouTube", "https://www.youtube.com/results?search_query=%s")
            .with_trigger("yt "),
    ]
}

/// Offers a web search for whatever nothing else matched, and answers
/// directly when a term starts with an engine's trigger.
#[derive(Clone)]
pub struct WebSearch {
    engines: Arc<[SearchEngine]>,
}

impl WebSearch {
    /// Engines whose item id is already taken are skipped; the first one
    /// configured wins.
    pub fn new(engines: Vec<SearchEngine>) -> Self {
        let mut seen = HashSet::new();
        let engines: Vec<SearchEngine> = engines
            .into_iter()
            .filter(|engine| {
                let fresh = seen.insert(engine.item_id());
                if !fresh {
                    warn!(engine = %engine.name, "skipping search engine with a duplicate name");
                }
                fresh
            })
            .collect();
        Self {
            engines: engines.into(),
        }
    }

    pub fn engines(&self) -> &[SearchEngine] {
        &self.engines
    }
}

impl FallbackProvider for WebSearch {
    fn id(&self) -> &str {
        EXTENSION_ID
    }

    fn handle_fallback_query(&self, query: &Query) -> anyhow::Result<()> {
        let term = query.search_term().trim();
        if term.is_empty() {
            return Ok(());
        }
        for engine in self.engines.iter() {
            query.add_match(engine.item(term), 0);
        }
        Ok(())
    }
}

impl PluginBundle for WebSearch {
    type Capabilities<'a> = Vec<Capability>;

    fn capabilities(&self) -> Self::Capabilities<'_> {
        let mut capabilities = vec![Capability::fallback_provider(self.clone())];
        capabilities.extend(
            self.engines
                .iter()
                .filter(|engine| engine.trigger.as_deref().is_some_and(|t| !t.is_empty()))
                .map(|engine| {
                    Capability::query_handler(TriggeredEngine {
                        id: engine.item_id(),
                        engine: engine.clone(),
                    })
                }),
        );
        capabilities
    }
}

/// One engine answering its own trigger.
struct TriggeredEngine {
    id: String,
    engine: SearchEngine,
}

impl QueryHandler for TriggeredEngine {
    fn id(&self) -> &str {
        &self.id
    }

    fn trigger(&self) -> Option<&str> {
        self.engine.trigger.as_deref()
    }

    fn handle_query(&self, query: &Query) -> anyhow::Result<()> {
        let triggered = self
            .trigger()
            .is_some_and(|trigger| query.original_search_term().starts_with(trigger));
        let term = query.search_term().trim();
        if triggered && !term.is_empty() {
            query.add_match(self.engine.item(term), 0);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use flint_plugin_api::Match;

    use super::*;

    fn answers(provider: &dyn FallbackProvider, term: &str) -> Vec<Match> {
        let (query, canceller) = Query::new(term, term);
        provider.handle_fallback_query(&query).expect("fallback");
        canceller.take_matches()
    }

    #[test]
    fn terms_are_percent_encoded() {
        let engine = SearchEngine::new("Docs", "https://docs.rs/releases/search?query=%s");
        assert_eq!(
            engine.url_for("serde json & more"),
            "https://docs.rs/releases/search?query=serde%20json%20%26%20more"
        );
    }

    #[test]
    fn fallback_offers_every_engine() {
        let web = WebSearch::new(default_engines());
        let matches = answers(&web, "rust");
        let ids: Vec<_> = matches.iter().map(Match::id).collect();
        assert_eq!(
            ids,
            ["websearch.google", "websearch.wikipedia", "websearch.youtube"]
        );
        assert_eq!(matches[0].item.text(), "Search for 'rust' in Google");
        assert_eq!(matches[0].item.subtext(), "https://www.google.com/search?q=rust");
    }

    #[test]
    fn blank_terms_offer_nothing() {
        let web = WebSearch::new(default_engines());
        assert!(answers(&web, "   ").is_empty());
    }

    #[test]
    fn bundle_registers_triggered_engines() {
        let web = WebSearch::new(vec![
            SearchEngine::new("Google", "https://g/?q=%s").with_trigger("gg "),
            SearchEngine::new("Plain", "https://p/?q=%s"),
        ]);
        let ids: Vec<String> = web
            .capabilities()
            .iter()
            .map(|capability| capability.id().to_string())
            .collect();
        assert_eq!(ids, ["websearch", "websearch.google"]);
    }

    #[test]
    fn triggered_engine_answers_only_its_trigger() {
        let handler = TriggeredEngine {
            id: "websearch.google".into(),
            engine: SearchEngine::new("Google", "https://g/?q=%s").with_trigger("gg "),
        };

        let (query, canceller) = Query::new("rust", "gg rust");
        handler.handle_query(&query).expect("handler");
        let matches = canceller.take_matches();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].item.subtext(), "https://g/?q=rust");

        let (query, canceller) = Query::new("rust", "rust");
        handler.handle_query(&query).expect("handler");
        assert_eq!(canceller.match_count(), 0);
    }

    #[test]
    fn engines_differing_only_in_case_collapse_to_the_first() {
        let web = WebSearch::new(vec![
            SearchEngine::new("Search", "https://one.example/?q=%s").with_trigger("s "),
            SearchEngine::new("search", "https://two.example/?q=%s").with_trigger("t "),
        ]);
        assert_eq!(web.engines().len(), 1);

        let matches = answers(&web, "rust");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].item.subtext(), "https://one.example/?q=rust");

        let mut registry = flint_plugin_api::PluginRegistry::empty();
        registry.register_bundle(&web).expect("bundle registers");
        assert_eq!(registry.len(), 2);
    }
}

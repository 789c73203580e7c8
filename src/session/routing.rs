use std::sync::Arc;

use flint_plugin_api::QueryHandler;

/// Handlers selected for a term and the term they see.
pub(super) struct Routed {
    pub(super) handlers: Vec<Arc<dyn QueryHandler>>,
    pub(super) search_term: String,
}

/// Pick the handlers a term is meant for.
///
/// A term starting with a handler's trigger goes only to the handlers sharing
/// the longest such trigger, minus the trigger and any whitespace after it.
/// Anything else goes to every handler unchanged.
pub(super) fn route(handlers: Vec<Arc<dyn QueryHandler>>, term: &str) -> Routed {
    let trigger = handlers
        .iter()
        .filter_map(|handler| handler.trigger())
        .filter(|trigger| !trigger.is_empty() && term.starts_with(trigger))
        .max_by_key(|trigger| trigger.len())
        .map(str::to_string);

    let Some(trigger) = trigger else {
        return Routed {
            handlers,
            search_term: term.to_string(),
        };
    };

    let search_term = term[trigger.len()..].trim_start().to_string();
    let handlers = handlers
        .into_iter()
        .filter(|handler| handler.trigger() == Some(trigger.as_str()))
        .collect();
    Routed {
        handlers,
        search_term,
    }
}

#[cfg(test)]
mod tests {
    use flint_plugin_api::Query;

    use super::*;

    struct Triggered(&'static str, Option<&'static str>);

    impl QueryHandler for Triggered {
        fn id(&self) -> &str {
            self.0
        }

        fn trigger(&self) -> Option<&str> {
            self.1
        }

        fn handle_query(&self, _query: &Query) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn handlers() -> Vec<Arc<dyn QueryHandler>> {
        vec![
            Arc::new(Triggered("apps", None)),
            Arc::new(Triggered("web", Some("!g"))),
            Arc::new(Triggered("github", Some("!gh"))),
            Arc::new(Triggered("blank", Some(""))),
        ]
    }

    fn ids(routed: &Routed) -> Vec<&str> {
        routed.handlers.iter().map(|handler| handler.id()).collect()
    }

    #[test]
    fn untriggered_terms_reach_every_handler() {
        let routed = route(handlers(), "firefox");
        assert_eq!(ids(&routed), ["apps", "web", "github", "blank"]);
        assert_eq!(routed.search_term, "firefox");
    }

    #[test]
    fn trigger_selects_handlers_and_strips_prefix() {
        let routed = route(handlers(), "!g   rust lang");
        assert_eq!(ids(&routed), ["web"]);
        assert_eq!(routed.search_term, "rust lang");
    }

    #[test]
    fn longest_trigger_wins() {
        let routed = route(handlers(), "!gh flint");
        assert_eq!(ids(&routed), ["github"]);
        assert_eq!(routed.search_term, "flint");
    }

    #[test]
    fn bare_trigger_yields_empty_term() {
        let routed = route(handlers(), "!g");
        assert_eq!(ids(&routed), ["web"]);
        assert_eq!(routed.search_term, "");
    }
}

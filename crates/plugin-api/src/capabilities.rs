use std::sync::Arc;

use crate::query::Query;

/// An extension that answers every (or every triggered) query.
///
/// Handlers run concurrently with each other on the query worker pool, so any
/// state they share must be synchronised by the handler itself.
pub trait QueryHandler: Send + Sync {
    /// Stable identifier, also used as the key for runtime statistics.
    fn id(&self) -> &str;

    /// Prefix that routes a query exclusively to this handler.
    fn trigger(&self) -> Option<&str> {
        None
    }

    /// Called once when the launcher is shown.
    fn setup_session(&self) {}

    /// Called once when the launcher is hidden.
    fn teardown_session(&self) {}

    /// Append matches for `query`. An error contributes no matches and is
    /// logged by the caller; it never aborts sibling handlers.
    fn handle_query(&self, query: &Query) -> anyhow::Result<()>;
}

/// An extension consulted only when no handler produced a match.
pub trait FallbackProvider: Send + Sync {
    fn id(&self) -> &str;

    /// Append last-resort matches for the raw term.
    fn handle_fallback_query(&self, query: &Query) -> anyhow::Result<()>;
}

/// Capabilities an extension can contribute to the registry.
#[derive(Clone)]
pub enum Capability {
    QueryHandler(Arc<dyn QueryHandler>),
    FallbackProvider(Arc<dyn FallbackProvider>),
}

impl Capability {
    /// Convenience constructor for a query handler capability.
    pub fn query_handler<H>(handler: H) -> Self
    where
        H: QueryHandler + 'static,
    {
        Self::QueryHandler(Arc::new(handler))
    }

    /// Convenience constructor for a fallback provider capability.
    pub fn fallback_provider<F>(provider: F) -> Self
    where
        F: FallbackProvider + 'static,
    {
        Self::FallbackProvider(Arc::new(provider))
    }

    /// Identifier of the extension behind the capability.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::QueryHandler(handler) => handler.id(),
            Self::FallbackProvider(provider) => provider.id(),
        }
    }
}

/// A collection of capabilities provided by one extension crate.
pub trait PluginBundle: Send + Sync {
    /// Iterator type yielded by [`capabilities`](Self::capabilities).
    type Capabilities<'a>: IntoIterator<Item = Capability>
    where
        Self: 'a;

    /// Enumerate the capabilities exposed by the bundle.
    fn capabilities(&self) -> Self::Capabilities<'_>;
}

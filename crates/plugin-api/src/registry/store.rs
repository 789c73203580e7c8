use std::sync::Arc;

use crate::capabilities::{Capability, FallbackProvider, PluginBundle, QueryHandler};
use crate::error::PluginRegistryError;

const QUERY_HANDLER: &str = "query handler";
const FALLBACK_PROVIDER: &str = "fallback provider";

/// Registry of every extension capability currently loaded.
///
/// Capabilities are kept per kind in registration order. The accessors hand
/// out snapshots, so an execution built from them is unaffected by later
/// registrations or removals.
#[derive(Clone, Default)]
pub struct PluginRegistry {
    handlers: Vec<Arc<dyn QueryHandler>>,
    fallbacks: Vec<Arc<dyn FallbackProvider>>,
}

impl PluginRegistry {
    /// Create a registry without any capabilities registered.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Install a single capability.
    pub fn install(&mut self, capability: Capability) -> Result<(), PluginRegistryError> {
        match capability {
            Capability::QueryHandler(handler) => {
                check_id(QUERY_HANDLER, handler.id(), self.handlers.iter().map(|h| h.id()))?;
                self.handlers.push(handler);
            }
            Capability::FallbackProvider(provider) => {
                check_id(
                    FALLBACK_PROVIDER,
                    provider.id(),
                    self.fallbacks.iter().map(|f| f.id()),
                )?;
                self.fallbacks.push(provider);
            }
        }
        Ok(())
    }

    /// Register a query handler.
    pub fn register_handler<H>(&mut self, handler: H) -> Result<(), PluginRegistryError>
    where
        H: QueryHandler + 'static,
    {
        self.install(Capability::query_handler(handler))
    }

    /// Register a fallback provider.
    pub fn register_fallback<F>(&mut self, provider: F) -> Result<(), PluginRegistryError>
    where
        F: FallbackProvider + 'static,
    {
        self.install(Capability::fallback_provider(provider))
    }

    /// Register every capability of a bundle, stopping at the first conflict.
    pub fn register_bundle<B>(&mut self, bundle: &B) -> Result<(), PluginRegistryError>
    where
        B: PluginBundle,
    {
        for capability in bundle.capabilities() {
            self.install(capability)?;
        }
        Ok(())
    }

    /// Snapshot of the registered query handlers.
    #[must_use]
    pub fn query_handlers(&self) -> Vec<Arc<dyn QueryHandler>> {
        self.handlers.clone()
    }

    /// Snapshot of the registered fallback providers.
    #[must_use]
    pub fn fallback_providers(&self) -> Vec<Arc<dyn FallbackProvider>> {
        self.fallbacks.clone()
    }

    /// Lookup a query handler by identifier.
    pub fn handler_by_id(&self, id: &str) -> Option<Arc<dyn QueryHandler>> {
        self.handlers.iter().find(|h| h.id() == id).cloned()
    }

    /// Remove every capability registered under `id`. Returns how many were
    /// removed.
    pub fn deregister_by_id(&mut self, id: &str) -> usize {
        let before = self.len();
        self.handlers.retain(|h| h.id() != id);
        self.fallbacks.retain(|f| f.id() != id);
        before - self.len()
    }

    /// Total number of registered capabilities.
    pub fn len(&self) -> usize {
        self.handlers.len() + self.fallbacks.len()
    }

    /// Returns `true` when nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty() && self.fallbacks.is_empty()
    }
}

fn check_id<'a>(
    capability: &'static str,
    id: &str,
    mut existing: impl Iterator<Item = &'a str>,
) -> Result<(), PluginRegistryError> {
    if id.is_empty() {
        return Err(PluginRegistryError::EmptyId { capability });
    }
    if existing.any(|other| other == id) {
        return Err(PluginRegistryError::DuplicateId {
            capability,
            id: id.to_string(),
        });
    }
    Ok(())
}

use thiserror::Error;

/// Errors that can occur when mutating the [`PluginRegistry`](crate::PluginRegistry).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PluginRegistryError {
    /// An extension attempted to register an identifier that already exists
    /// for the same capability.
    #[error("{capability} '{id}' is already registered")]
    DuplicateId {
        capability: &'static str,
        id: String,
    },

    /// Identifiers key runtime statistics and therefore must not be empty.
    #[error("{capability} registered with an empty id")]
    EmptyId { capability: &'static str },
}

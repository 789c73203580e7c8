//! Interfaces shared between the flint core and its extensions.
//!
//! Extensions implement [`QueryHandler`] and/or [`FallbackProvider`], answer
//! queries by appending [`Match`]es to the [`Query`] they are handed, and may
//! use an [`OfflineIndex`] (usually published through a [`SharedIndex`]) to
//! answer quickly.

pub mod capabilities;
pub mod error;
pub mod index;
pub mod item;
pub mod query;
pub mod registry;

pub use capabilities::{Capability, FallbackProvider, PluginBundle, QueryHandler};
pub use error::PluginRegistryError;
pub use index::{OfflineIndex, SharedIndex, tokenize};
pub use item::{Indexable, Item, StandardItem};
pub use query::{Match, Query, QueryCanceller};
pub use registry::PluginRegistry;

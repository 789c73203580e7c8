//! Configuration loading and resolution.
//!
//! Files, `FLINT__*` environment variables and CLI flags are layered by
//! [`load`] into a validated [`ResolvedConfig`].

mod loader;
mod raw;
mod resolved;
mod sources;

pub use loader::load;
pub use resolved::{ResolvedConfig, StorageLocation};

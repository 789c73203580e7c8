//! In-memory keyword index used by extensions to answer queries without
//! touching their data source.

mod fuzzy;
mod offline;
mod shared;
mod tokenize;

pub use offline::OfflineIndex;
pub use shared::SharedIndex;
pub use tokenize::tokenize;

#[cfg(test)]
mod tests;

mod store;

pub use store::PluginRegistry;

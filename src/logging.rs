//! Diagnostic output for the `flint` binary.
//!
//! The library only emits `tracing` events; installing a subscriber is left to
//! whoever embeds it. The binary calls [`initialize`] once at startup.

use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive that overrides the
/// verbosity flag.
pub const LOG_ENV: &str = "FLINT_LOG";

/// Map the `-v` count to a default filter directive.
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "flint=info,flint_plugin_api=info,flint_plugins_bookmarks=info,warn",
        2 => "flint=debug,flint_plugin_api=debug,flint_plugins_bookmarks=debug,info",
        _ => "trace",
    }
}

/// Install a stderr subscriber. Stdout stays reserved for results.
///
/// Calling this twice is harmless; the second subscriber is ignored.
pub fn initialize(verbosity: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}

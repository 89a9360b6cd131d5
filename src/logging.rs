//! Tracing subscriber setup for binaries and demos.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `stateful_screens=debug`.
pub const LOG_ENV: &str = "STATEFUL_SCREENS_LOG";

/// Install a fmt subscriber filtered by [`LOG_ENV`] (default `info`).
///
/// Calling it again once a global subscriber is set does nothing.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .try_init();
}

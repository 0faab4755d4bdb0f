//! Tracing subscriber initialisation.

use tracing_subscriber::{EnvFilter, fmt};

/// Installs the global subscriber.
///
/// The filter is read from `RUST_LOG` and defaults to `info`, e.g.
/// `RUST_LOG=settlement_engine=debug`.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .init();
}

/// Installs a debug-level subscriber that writes through the test harness.
///
/// Safe to call from several tests; only the first call installs it.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

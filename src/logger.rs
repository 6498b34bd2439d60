//! Logging setup for the experiment binary and tests
//!
//! The library only emits through the `log` macros. Whoever owns `main` calls
//! [`initialize_logger`] once to route them to `env_logger`.

use std::sync::Once;

use env_logger::Builder;
use log::LevelFilter;

/// Guards the one-time logger setup
static INIT: Once = Once::new();

/// Installs the global `env_logger` backend.
///
/// Defaults to `Info`, `RUST_LOG` overrides it. Safe to call more than once.
pub fn initialize_logger() {
    INIT.call_once_force(|_| {
        let mut builder = Builder::new();

        builder
            .filter_level(LevelFilter::Info)
            .filter_module("probe_lab", LevelFilter::Info)
            .format_timestamp_millis()
            .parse_default_env();

        // Another backend may already be installed, e.g. by a test harness.
        builder.try_init().ok();
    });
}

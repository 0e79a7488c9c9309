//! Logging setup for blockpress front ends.
//!
//! The library itself only emits `tracing` events; initialising a
//! subscriber is the host application's call. This helper gives the CLI the
//! standard console setup: compact fmt layer, level from `RUST_LOG`
//! (defaulting to `info`).

use tracing_subscriber::EnvFilter;

/// Initialise console logging.
///
/// Reads the filter from `RUST_LOG`, defaulting to `info`. Calling this
/// twice (or alongside another global subscriber) is an error in the
/// tracing stack; returns whether initialisation took effect.
pub fn init_console_logging() -> bool {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init()
        .is_ok()
}

//! Tracing initialization helper.
//!
//! The library never installs a global subscriber on a host's behalf —
//! `Logger` in spec.md §3 is supplied by the caller — but the crate's own
//! tests and examples use [`init`] to get the same `EnvFilter`-driven
//! layout the teacher's CLI entry point installs.

use tracing_subscriber::prelude::*;

/// Install a stderr `tracing_subscriber` layer honoring `RUST_LOG`, falling
/// back to `error`-only when the variable is unset. Safe to call more than
/// once; later calls are no-ops.
pub fn init() {
    let env_filter = std::env::var("RUST_LOG")
        .ok()
        .map(|_| tracing_subscriber::EnvFilter::from_default_env())
        .unwrap_or_else(|| tracing_subscriber::EnvFilter::new("error"));

    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);

    let init_result = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init();

    if let Err(err) = init_result {
        tracing::debug!(error = %err, "tracing already initialized; skipping");
    }
}

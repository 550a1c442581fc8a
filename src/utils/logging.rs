//! Logging bootstrap for the `rulepub` binary.
//!
//! The publishing stage itself never touches a global logger: it reports
//! through an injected `ObservabilitySink`. The default sink forwards to
//! `tracing`, and this module installs the subscriber that prints it.

use tracing::Level;

/// Map a configured level name onto a `tracing::Level`.
///
/// Unknown names fall back to `INFO`.
pub fn parse_level(name: &str) -> Level {
    match name.trim().to_lowercase().as_str() {
        "error" => Level::ERROR,
        "warn" | "warning" => Level::WARN,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => Level::INFO,
    }
}

/// Initialize the fmt subscriber with the given maximum level.
pub fn init(level: &str) {
    // try_init so tests and the binary can both call this
    let _ = tracing_subscriber::fmt()
        .with_max_level(parse_level(level))
        .with_target(true)
        .try_init();
}

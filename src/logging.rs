//! Diagnostic logging.
//!
//! Logs go to stderr so stdout carries only the report (text or JSON).
//! `RUST_LOG` overrides the default filter.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Calling it again is a no-op.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}

fn default_directive(verbose: bool) -> &'static str {
    if verbose { "comed_prices=debug" } else { "comed_prices=info" }
}

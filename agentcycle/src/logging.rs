//! Diagnostic tracing for the lifecycle driver.
//!
//! Tracing goes to stderr. `agentcycle trace` writes its simulation table to
//! stdout, so the two never mix.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG` when set. Otherwise defaults to `warn`, or to
/// `agentcycle=info` when `verbose` is requested.
///
/// # Example
/// ```bash
/// RUST_LOG=agentcycle=debug agentcycle run
/// ```
pub fn init(verbose: bool) {
    let fallback = if verbose { "warn,agentcycle=info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}

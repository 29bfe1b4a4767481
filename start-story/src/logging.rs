//! Diagnostic tracing for `start-story`.
//!
//! User-facing output (the success line and the error message) is printed
//! directly; tracing is for debugging tracker and git calls via `RUST_LOG`.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG`. Defaults to `warn` if unset, so suppressed per-project
/// lookup errors are visible without extra flags.
/// Output: stderr, compact format.
///
/// # Example
/// ```bash
/// RUST_LOG=start_story=debug start-story --id 42 --branch login-form
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}

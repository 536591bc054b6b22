//! Test-time tracing for debugging fixture runs.
//!
//! The `pura` library only emits events; it never installs a subscriber.
//! Conformance tests call [`init`] so that `RUST_LOG=pura=debug` shows which
//! arm fired for each case.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize a tracing subscriber for test logging.
///
/// Reads `RUST_LOG` env var. Defaults to `warn` if unset.
/// Output: stderr, compact format. Safe to call from every test; only the
/// first call installs the subscriber.
///
/// # Example
/// ```bash
/// RUST_LOG=pura=debug cargo test -p pura-test
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init();
}

//! Tracing initialisation for tests.

use tracing_subscriber::EnvFilter;

/// Install a subscriber that writes to the test-harness writer and honours
/// `RUST_LOG` (default `info`).
///
/// Idempotent: later calls in the same process are ignored.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init();
}

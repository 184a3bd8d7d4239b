//! Logging setup for tests.

use once_cell::sync::OnceCell;

static INIT: OnceCell<()> = OnceCell::new();

/// Install a tracing subscriber for the current test binary.
///
/// Safe to call from every test; only the first call installs anything.
/// Filtering follows `RUST_LOG`, so `RUST_LOG=conforma_harness=debug`
/// surfaces registration and finalization events.
pub fn init_test_logging() {
    INIT.get_or_init(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

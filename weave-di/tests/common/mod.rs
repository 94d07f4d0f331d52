//! Helpers shared by the integration tests

use tracing_subscriber::EnvFilter;

/// Route library events to the test output; `RUST_LOG` selects the level
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

//! Shared test helpers.

use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize tracing once for the whole test binary.
pub fn setup_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .init();
    });
}

// ABOUTME: Test support utilities.
// ABOUTME: Provides a scripted transport and an SSH container helper for integration tests.

use remote_exec::{RetryPolicy, SessionConfig};
use std::sync::Once;

// Each test binary only uses some of these modules, so allow dead_code.
#[allow(dead_code)]
pub mod mock_transport;
#[allow(dead_code)]
pub mod ssh_container;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env()
            .add_directive("remote_exec=debug".parse().unwrap())
            .add_directive("russh=info".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Configuration for tests against the scripted transport: three
/// immediate attempts.
#[allow(dead_code)]
pub fn mock_config() -> SessionConfig {
    SessionConfig::new("node1.test")
        .with_username("tester")
        .with_retry(RetryPolicy::immediate(3))
}

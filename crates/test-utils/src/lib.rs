//! Shared helpers for watchtest integration tests.
//!
//! - [`builders`]: config files and rerun cores with test-friendly defaults.
//! - [`fake_engine`]: a scripted execution engine, a recording reporter and
//!   a harness that runs a full session on the test runtime.

pub mod builders;
pub mod fake_engine;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

static INIT: Once = Once::new();

/// Initialise tracing once per test binary.
///
/// Output goes through the test writer, so it only shows up for failing
/// tests. Defaults to `watchtest=debug`; override with `RUST_LOG`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("warn,watchtest=debug"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(false)
            .init();
    });
}

/// Fail the test if `f` takes longer than five seconds.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    tokio::time::timeout(Duration::from_secs(5), f)
        .await
        .expect("test timed out after 5 seconds")
}

/// Let a paused test clock run well past every debounce timer, so that all
/// pending batches are flushed and settled runs are processed.
pub async fn quiesce() {
    tokio::time::sleep(Duration::from_secs(1)).await;
}

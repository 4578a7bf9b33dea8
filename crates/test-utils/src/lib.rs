pub mod builders;
pub mod fake_executor;

use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Install a tracing subscriber for tests, once per test binary.
///
/// The filter comes from `MAKEDAG_LOG` (the variable the binary reads), then
/// `RUST_LOG`, then `info`. Output goes through the test writer, so it only
/// shows up for failing tests unless run with `-- --nocapture`:
/// `MAKEDAG_LOG=makedag::engine=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env("MAKEDAG_LOG")
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new("info"));

        // Another harness may already have installed a global subscriber.
        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}

/// Await `f`, failing the test if it takes longer than five seconds.
///
/// Real-shell tests sleep in child processes; a hung interrupt path would
/// otherwise block the whole run.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(std::time::Duration::from_secs(5), f)
        .await
        .expect("test timed out after 5 seconds")
}

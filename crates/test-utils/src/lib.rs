//! Shared helpers for the luatask integration tests.

pub mod fake_backend;
pub mod fixtures;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use luatask::logging::{LOG_ENV, build_filter};
use tracing_subscriber::fmt;

pub use fake_backend::FakeBackend;
pub use fixtures::{ScriptBuilder, ScriptFixture, lua_str};

/// Upper bound for any async queue run in tests.
pub const QUEUE_TIMEOUT: Duration = Duration::from_secs(5);

static INIT: Once = Once::new();

/// Install a test subscriber using the same filter rules as the binary.
///
/// Output is captured per test and shown for failures; set e.g.
/// `LUATASK_LOG=luatask::script=trace` to see engine internals.
pub fn init_tracing() {
    INIT.call_once(|| {
        let env = std::env::var(LOG_ENV).ok();
        let Ok(filter) = build_filter(None, env.as_deref()) else {
            panic!("{LOG_ENV} does not parse as a tracing filter");
        };

        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}

/// Await `f`, failing the test if the queue does not settle in time.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(QUEUE_TIMEOUT, f).await {
        Ok(value) => value,
        Err(_) => panic!("task queue did not finish within {QUEUE_TIMEOUT:?}"),
    }
}

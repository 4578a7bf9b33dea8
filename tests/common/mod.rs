#![allow(dead_code)]
#![allow(unused_imports)]

use std::path::PathBuf;

pub use makedag_test_utils::builders;
pub use makedag_test_utils::fake_executor::FakeExecutor;
pub use makedag_test_utils::{init_tracing, with_timeout};

/// Path of a task file shipped at the repository root.
pub fn shipped(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(name)
}

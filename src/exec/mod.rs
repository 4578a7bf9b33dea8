// src/exec/mod.rs

//! Process execution layer.
//!
//! This module runs recipe lines, one at a time, and reports each line's
//! exit status back to the runtime.
//!
//! - [`backend`] provides the `ExecutorBackend` trait and the dry-run
//!   implementation; tests replace it with a fake.
//! - [`command`] holds `ShellExecutor`, the production backend built on
//!   `tokio::process::Command`.

pub mod backend;
pub mod command;

pub use backend::{DryRunExecutor, ExecutorBackend};
pub use command::ShellExecutor;

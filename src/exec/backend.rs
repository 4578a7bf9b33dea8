// src/exec/backend.rs

//! Pluggable executor backend abstraction.
//!
//! The runtime talks to an `ExecutorBackend` instead of spawning processes
//! itself. This makes it easy to swap in a fake executor in tests while
//! keeping the production implementation in [`command`](super::command).
//!
//! - `ShellExecutor` runs each recipe line through the shell.
//! - `DryRunExecutor` prints each line and reports success (`--dry-run`).
//! - Tests provide their own `ExecutorBackend` that records lines and
//!   returns scripted outcomes.

use std::future::Future;
use std::pin::Pin;

use crate::dag::ScheduledLine;
use crate::engine::LineOutcome;
use crate::errors::Result;

/// Trait abstracting how a recipe line is executed.
///
/// The runtime awaits the returned future before dispatching anything else.
/// Dropping the future early (on Ctrl-C) must stop the line's process.
pub trait ExecutorBackend: Send {
    fn run_line(
        &mut self,
        line: ScheduledLine,
    ) -> Pin<Box<dyn Future<Output = Result<LineOutcome>> + Send + '_>>;
}

/// Executor used for `--dry-run`: prints commands, runs nothing.
///
/// Silent (`@`) lines are printed too, so the output shows everything a
/// real run would execute.
#[derive(Debug, Default)]
pub struct DryRunExecutor;

impl ExecutorBackend for DryRunExecutor {
    fn run_line(
        &mut self,
        line: ScheduledLine,
    ) -> Pin<Box<dyn Future<Output = Result<LineOutcome>> + Send + '_>> {
        Box::pin(async move {
            println!("{}", line.line.command);
            Ok(LineOutcome::Success)
        })
    }
}

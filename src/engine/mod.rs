// src/engine/mod.rs

//! Orchestration engine for makedag.
//!
//! The pure core state machine lives in [`core`]; it consumes
//! [`RuntimeEvent`]s and answers each one with exactly one [`CoreCommand`].
//! The async/IO shell in [`runtime`] performs those commands (stat files,
//! run recipe lines, watch for Ctrl-C) and feeds the results back.

use std::path::PathBuf;

use crate::dag::ScheduledLine;
use crate::engine::freshness::FreshnessCheck;

/// Canonical task name type used throughout the engine.
pub type TaskName = String;

/// Exit status reported when the invocation is interrupted (128 + SIGINT).
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Outcome of one recipe line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    Success,
    /// Non-zero exit. Processes killed by a signal report `1`.
    Failed(i32),
}

/// Final outcome of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationOutcome {
    Succeeded,
    Failed { task: TaskName, exit_code: i32 },
    Interrupted,
}

impl InvocationOutcome {
    /// Process exit status for this outcome.
    pub fn exit_code(&self) -> i32 {
        match self {
            InvocationOutcome::Succeeded => 0,
            InvocationOutcome::Failed { exit_code, .. } => *exit_code,
            InvocationOutcome::Interrupted => INTERRUPTED_EXIT_CODE,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, InvocationOutcome::Succeeded)
    }
}

/// Lifecycle of one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationState {
    Requested,
    Resolving,
    Executing,
    Succeeded,
    Failed,
    Interrupted,
}

impl InvocationState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            InvocationState::Succeeded | InvocationState::Failed | InvocationState::Interrupted
        )
    }
}

/// Events flowing into the core from the IO shell.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// Begin the invocation.
    Started,
    /// Result of a [`CoreCommand::CheckSource`].
    SourceChecked { path: PathBuf, exists: bool },
    /// Result of a [`CoreCommand::CheckFreshness`].
    FreshnessChecked { task: TaskName, check: FreshnessCheck },
    /// A recipe line finished.
    LineCompleted { task: TaskName, outcome: LineOutcome },
    /// The user interrupted the invocation (Ctrl-C).
    Interrupted,
    /// Result of a [`CoreCommand::RemovePartialTarget`].
    CleanupFinished,
}

/// What the core wants the IO shell to do next.
#[derive(Debug, Clone)]
pub enum CoreCommand {
    /// Make sure a prerequisite without a rule exists.
    CheckSource {
        path: PathBuf,
        needed_by: Option<TaskName>,
    },
    /// Compare a file target with its inputs.
    CheckFreshness {
        task: TaskName,
        target: PathBuf,
        inputs: Vec<PathBuf>,
    },
    /// Run one recipe line and wait for it.
    RunLine(ScheduledLine),
    /// Delete `target` if the interrupted recipe changed it.
    RemovePartialTarget {
        task: TaskName,
        target: PathBuf,
        previous_mtime: Option<std::time::SystemTime>,
    },
    /// The invocation is over.
    Finish(InvocationOutcome),
}

pub mod core;
pub mod freshness;
pub mod runtime;

pub use core::CoreRuntime;
pub use freshness::{Freshness, StaleReason};
pub use runtime::Runtime;

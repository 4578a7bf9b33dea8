// src/dag/task_info.rs

//! Task metadata and per-invocation state.

use std::path::PathBuf;

use crate::config::model::{ConfigFile, TaskConfig};
use crate::engine::TaskName;
use crate::types::TaskKindSpec;

/// Per-invocation state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskRunState {
    /// The task is not reachable from the requested goals.
    NotInRun,
    /// Planned; waiting for earlier steps.
    Pending,
    /// Recipe lines are being executed.
    Running,
    /// File target was found up to date; recipe skipped.
    UpToDate,
    /// Every recipe line finished (or was best-effort).
    DoneSuccess,
    /// A recipe line failed; this ended the invocation.
    DoneFailed,
    /// Never reached because an earlier step failed or the run was interrupted.
    Abandoned,
}

impl TaskRunState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskRunState::UpToDate
                | TaskRunState::DoneSuccess
                | TaskRunState::DoneFailed
                | TaskRunState::Abandoned
        )
    }
}

/// How a task decides whether its recipe has to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskKind {
    /// Always runs when reached.
    Phony,
    /// Runs only when `path` is missing or older than one of `inputs`.
    ///
    /// `inputs` are the prerequisites that denote files: paths without a
    /// rule, and other file-backed tasks. Phony prerequisites never count.
    File { path: PathBuf, inputs: Vec<PathBuf> },
}

/// One line of a recipe with its make-style prefixes already stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeLine {
    pub command: String,
    /// `-` prefix: a non-zero exit is reported and ignored.
    pub ignore_errors: bool,
    /// `@` prefix: do not echo the command before running it.
    pub silent: bool,
}

impl RecipeLine {
    pub fn parse(raw: &str) -> Self {
        let mut ignore_errors = false;
        let mut silent = false;
        let mut rest = raw.trim_start();

        loop {
            if let Some(r) = rest.strip_prefix('-') {
                ignore_errors = true;
                rest = r.trim_start();
            } else if let Some(r) = rest.strip_prefix('@') {
                silent = true;
                rest = r.trim_start();
            } else {
                break;
            }
        }

        Self {
            command: rest.to_string(),
            ignore_errors,
            silent,
        }
    }
}

/// Static task information derived from config.
#[derive(Debug, Clone)]
pub struct TaskInfo {
    pub name: TaskName,
    pub kind: TaskKind,
    /// Direct prerequisites in declaration order (tasks and plain files).
    pub deps: Vec<TaskName>,
    pub recipe: Vec<RecipeLine>,
}

impl TaskInfo {
    pub fn from_config(name: TaskName, tc: &TaskConfig, cfg: &ConfigFile) -> Self {
        let kind = match tc.kind {
            TaskKindSpec::Phony => TaskKind::Phony,
            TaskKindSpec::File => {
                let inputs = tc
                    .deps
                    .iter()
                    .filter(|dep| denotes_file(dep, cfg))
                    .map(PathBuf::from)
                    .collect();
                TaskKind::File {
                    path: PathBuf::from(&name),
                    inputs,
                }
            }
        };

        let recipe = tc
            .cmd
            .lines()
            .iter()
            .map(|line| RecipeLine::parse(line))
            .filter(|line| !line.command.is_empty())
            .collect();

        Self {
            name,
            kind,
            deps: tc.deps.clone(),
            recipe,
        }
    }
}

fn denotes_file(dep: &str, cfg: &ConfigFile) -> bool {
    match cfg.task.get(dep) {
        Some(task) => task.kind == TaskKindSpec::File,
        None => true,
    }
}

/// A recipe line the runtime wants the executor to run now.
#[derive(Debug, Clone)]
pub struct ScheduledLine {
    pub task: TaskName,
    /// Zero-based position of the line in its recipe.
    pub index: usize,
    pub line: RecipeLine,
}

// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! This module contains a synchronous, deterministic "core runtime" that
//! consumes [`RuntimeEvent`]s and produces the single next [`CoreCommand`]
//! for the IO shell (`engine::runtime::Runtime`) to perform.
//!
//! Execution is strictly sequential: at most one command is outstanding at
//! any time, and every command is answered by exactly one event.
//!
//! The core has no Tokio types, channels, filesystem or processes, so it can
//! be stepped by hand in tests.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, info, warn};

use crate::dag::{PlanStep, ScheduledLine, Scheduler, TaskKind};
use crate::engine::freshness::Freshness;
use crate::engine::{
    CoreCommand, InvocationOutcome, InvocationState, LineOutcome, RuntimeEvent, TaskName,
};
use crate::errors::{MakedagError, Result};

/// The task whose recipe is currently executing.
#[derive(Debug)]
struct ActiveTask {
    name: TaskName,
    next_line: usize,
    /// For file tasks: the target and its mtime before the recipe started.
    target: Option<(PathBuf, Option<SystemTime>)>,
}

/// Pure core runtime state.
#[derive(Debug)]
pub struct CoreRuntime {
    scheduler: Scheduler,
    goals: Vec<TaskName>,
    state: InvocationState,
    active: Option<ActiveTask>,
    /// Set once a `Finish` command has been produced.
    outcome: Option<InvocationOutcome>,
}

impl CoreRuntime {
    pub fn new(scheduler: Scheduler, goals: Vec<TaskName>) -> Self {
        Self {
            scheduler,
            goals,
            state: InvocationState::Requested,
            active: None,
            outcome: None,
        }
    }

    pub fn state(&self) -> InvocationState {
        self.state
    }

    /// Expose the scheduler (for tests and diagnostics).
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Handle a single event, returning the next command for the IO shell.
    ///
    /// Errors are runner failures (unknown goal, missing source file, cycle);
    /// they leave the invocation in the `Failed` state.
    pub fn step(&mut self, event: RuntimeEvent) -> Result<CoreCommand> {
        let result = self.step_inner(event);
        match &result {
            Ok(CoreCommand::Finish(outcome)) => self.outcome = Some(outcome.clone()),
            Ok(_) => {}
            Err(_) => {
                self.state = InvocationState::Failed;
                self.active = None;
                self.scheduler.abandon_remaining();
            }
        }
        result
    }

    /// Final outcome, once the invocation has finished.
    pub fn outcome(&self) -> Option<&InvocationOutcome> {
        self.outcome.as_ref()
    }

    fn step_inner(&mut self, event: RuntimeEvent) -> Result<CoreCommand> {
        match event {
            RuntimeEvent::Started => self.handle_started(),
            RuntimeEvent::SourceChecked { path, exists } => {
                self.handle_source_checked(path, exists)
            }
            RuntimeEvent::FreshnessChecked { task, check } => {
                match check.verdict {
                    Freshness::UpToDate => {
                        self.scheduler.mark_up_to_date(&task);
                        self.advance()
                    }
                    Freshness::Stale(reason) => {
                        debug!(task = %task, ?reason, "file target is stale");
                        let target = match self.scheduler.task(&task).map(|t| &t.kind) {
                            Some(TaskKind::File { path, .. }) => {
                                Some((path.clone(), check.target_mtime))
                            }
                            _ => None,
                        };
                        self.start_task(task, target)
                    }
                }
            }
            RuntimeEvent::LineCompleted { task, outcome } => {
                self.handle_line_completed(task, outcome)
            }
            RuntimeEvent::Interrupted => Ok(self.handle_interrupted()),
            RuntimeEvent::CleanupFinished => {
                if self.state != InvocationState::Interrupted {
                    return Err(unexpected("cleanup finished without an interruption"));
                }
                Ok(CoreCommand::Finish(InvocationOutcome::Interrupted))
            }
        }
    }

    fn handle_started(&mut self) -> Result<CoreCommand> {
        if self.state != InvocationState::Requested {
            return Err(unexpected("invocation already started"));
        }

        self.state = InvocationState::Resolving;
        let goals = self.goals.clone();
        let plan = self.scheduler.plan_goals(&goals)?;
        info!(
            ?goals,
            tasks = ?plan.task_names().collect::<Vec<_>>(),
            "resolved invocation plan"
        );

        self.advance()
    }

    fn handle_source_checked(&mut self, path: PathBuf, exists: bool) -> Result<CoreCommand> {
        if exists {
            return self.advance();
        }

        let needed_by = self.pending_source_owner(&path);
        let target = path.display().to_string();
        match needed_by {
            Some(needed_by) => Err(MakedagError::NoRule { target, needed_by }),
            None => Err(MakedagError::TaskNotFound(target)),
        }
    }

    /// Who needed the source file we just checked, according to the plan.
    fn pending_source_owner(&self, source: &Path) -> Option<TaskName> {
        self.scheduler.plan().steps.iter().find_map(|step| match step {
            PlanStep::Source { path, needed_by } if path == source => needed_by.clone(),
            _ => None,
        })
    }

    fn handle_line_completed(&mut self, task: TaskName, outcome: LineOutcome) -> Result<CoreCommand> {
        let Some(active) = self.active.as_mut() else {
            return Err(unexpected(&format!(
                "line completion for '{task}' with no active task"
            )));
        };

        if active.name != task {
            return Err(unexpected(&format!(
                "line completion for '{task}' while '{}' is active",
                active.name
            )));
        }

        let index = active.next_line;
        active.next_line += 1;

        if let LineOutcome::Failed(code) = outcome {
            let ignore = self
                .scheduler
                .task(&task)
                .and_then(|t| t.recipe.get(index))
                .is_some_and(|line| line.ignore_errors);

            if ignore {
                warn!(task = %task, exit_code = code, "recipe line failed (ignored)");
            } else {
                self.scheduler.mark_failed(&task);
                self.active = None;
                self.state = InvocationState::Failed;
                return Ok(CoreCommand::Finish(InvocationOutcome::Failed {
                    task,
                    exit_code: code,
                }));
            }
        }

        self.next_line()
    }

    fn handle_interrupted(&mut self) -> CoreCommand {
        if let Some(outcome) = &self.outcome {
            return CoreCommand::Finish(outcome.clone());
        }

        self.state = InvocationState::Interrupted;
        self.scheduler.abandon_remaining();

        match self.active.take() {
            Some(ActiveTask {
                name,
                target: Some((target, previous_mtime)),
                ..
            }) => {
                info!(task = %name, "interrupted while building file target");
                CoreCommand::RemovePartialTarget {
                    task: name,
                    target,
                    previous_mtime,
                }
            }
            _ => CoreCommand::Finish(InvocationOutcome::Interrupted),
        }
    }

    /// Hand out plan steps until one needs the IO shell.
    fn advance(&mut self) -> Result<CoreCommand> {
        let Some(step) = self.scheduler.next_step() else {
            self.state = InvocationState::Succeeded;
            return Ok(CoreCommand::Finish(InvocationOutcome::Succeeded));
        };

        match step {
            PlanStep::Source { path, needed_by } => Ok(CoreCommand::CheckSource { path, needed_by }),
            PlanStep::Task(name) => {
                let kind = self.scheduler.task(&name).map(|t| t.kind.clone());
                match kind {
                    Some(TaskKind::File { path, inputs }) => Ok(CoreCommand::CheckFreshness {
                        task: name,
                        target: path,
                        inputs,
                    }),
                    Some(TaskKind::Phony) => self.start_task(name, None),
                    None => Err(MakedagError::TaskNotFound(name)),
                }
            }
        }
    }

    fn start_task(
        &mut self,
        name: TaskName,
        target: Option<(PathBuf, Option<SystemTime>)>,
    ) -> Result<CoreCommand> {
        self.state = InvocationState::Executing;
        self.scheduler.mark_running(&name);
        self.active = Some(ActiveTask {
            name,
            next_line: 0,
            target,
        });
        self.next_line()
    }

    /// Dispatch the active task's next line, or finish it.
    fn next_line(&mut self) -> Result<CoreCommand> {
        let Some(active) = self.active.as_ref() else {
            return self.advance();
        };

        let line = self
            .scheduler
            .task(&active.name)
            .and_then(|t| t.recipe.get(active.next_line))
            .cloned();

        match line {
            Some(line) => Ok(CoreCommand::RunLine(ScheduledLine {
                task: active.name.clone(),
                index: active.next_line,
                line,
            })),
            None => {
                let name = active.name.clone();
                self.scheduler.mark_succeeded(&name);
                self.active = None;
                self.advance()
            }
        }
    }
}

fn unexpected(what: &str) -> MakedagError {
    MakedagError::Other(anyhow::anyhow!("unexpected runtime event: {what}"))
}

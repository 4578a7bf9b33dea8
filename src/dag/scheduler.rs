use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::config::model::ConfigFile;
use crate::dag::graph::DagGraph;
use crate::dag::plan::{Plan, PlanStep};
use crate::dag::task_info::{TaskInfo, TaskRunState};
use crate::engine::TaskName;
use crate::errors::Result;

/// Scheduler holds the immutable task graph plus per-invocation state.
///
/// It is responsible for:
/// - resolving the requested goals into a [`Plan`]
/// - handing out plan steps one at a time, strictly in order
/// - recording what happened to each task in this invocation
/// - abandoning the rest of the plan once something fails
#[derive(Debug)]
pub struct Scheduler {
    graph: DagGraph,
    tasks: HashMap<TaskName, TaskInfo>,
    plan: Plan,
    /// Index of the next plan step to hand out.
    cursor: usize,
    states: HashMap<TaskName, TaskRunState>,
}

impl Scheduler {
    /// Construct a scheduler from a validated [`ConfigFile`].
    pub fn from_config(cfg: &ConfigFile) -> Self {
        let graph = DagGraph::from_config(cfg);

        let tasks = cfg
            .task
            .iter()
            .map(|(name, tc)| (name.clone(), TaskInfo::from_config(name.clone(), tc, cfg)))
            .collect();

        Self {
            graph,
            tasks,
            plan: Plan::default(),
            cursor: 0,
            states: HashMap::new(),
        }
    }

    /// Resolve `goals` and mark every planned task `Pending`.
    pub fn plan_goals(&mut self, goals: &[TaskName]) -> Result<&Plan> {
        self.plan = Plan::resolve(&self.graph, goals)?;
        self.cursor = 0;
        self.states.clear();

        for name in self.plan.task_names() {
            self.states.insert(name.to_string(), TaskRunState::Pending);
        }

        debug!(
            ?goals,
            steps = self.plan.steps.len(),
            "scheduler: resolved invocation plan"
        );
        Ok(&self.plan)
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    /// Static information about a declared task.
    pub fn task(&self, name: &str) -> Option<&TaskInfo> {
        self.tasks.get(name)
    }

    /// Read-only view of the given task's state; `None` for undeclared names.
    pub fn run_state_of(&self, task: &str) -> Option<TaskRunState> {
        if !self.tasks.contains_key(task) {
            return None;
        }
        Some(
            self.states
                .get(task)
                .copied()
                .unwrap_or(TaskRunState::NotInRun),
        )
    }

    /// Hand out the next plan step, or `None` once the plan is exhausted.
    pub fn next_step(&mut self) -> Option<PlanStep> {
        let step = self.plan.steps.get(self.cursor).cloned()?;
        self.cursor += 1;
        Some(step)
    }

    /// Whether every planned task reached a terminal state.
    pub fn is_finished(&self) -> bool {
        self.states.values().all(|s| s.is_terminal())
    }

    pub fn mark_running(&mut self, task: &str) {
        self.set_state(task, TaskRunState::Running);
    }

    pub fn mark_up_to_date(&mut self, task: &str) {
        info!(task = %task, "target is up to date; skipping recipe");
        self.set_state(task, TaskRunState::UpToDate);
    }

    pub fn mark_succeeded(&mut self, task: &str) {
        debug!(task = %task, "task completed successfully");
        self.set_state(task, TaskRunState::DoneSuccess);
    }

    /// Mark `task` failed and abandon everything that has not run yet.
    pub fn mark_failed(&mut self, task: &str) {
        self.set_state(task, TaskRunState::DoneFailed);
        let abandoned = self.abandon_remaining();
        if !abandoned.is_empty() {
            warn!(
                task = %task,
                ?abandoned,
                "task failed; abandoning the rest of the plan"
            );
        }
    }

    /// Mark every non-terminal task `Abandoned` and exhaust the plan.
    ///
    /// Returns the names that were abandoned.
    pub fn abandon_remaining(&mut self) -> Vec<TaskName> {
        self.cursor = self.plan.steps.len();

        let mut abandoned: Vec<TaskName> = Vec::new();
        for name in self.plan.task_names() {
            if let Some(state) = self.states.get_mut(name) {
                if !state.is_terminal() {
                    *state = TaskRunState::Abandoned;
                    abandoned.push(name.to_string());
                }
            }
        }
        abandoned
    }

    fn set_state(&mut self, task: &str, state: TaskRunState) {
        match self.states.get_mut(task) {
            Some(current) => *current = state,
            None => warn!(task = %task, ?state, "state change for task outside the plan; ignoring"),
        }
    }
}

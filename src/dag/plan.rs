// src/dag/plan.rs

//! Depth-first resolution of the requested goals into a linear plan.

use std::collections::HashSet;
use std::path::PathBuf;

use crate::dag::graph::DagGraph;
use crate::engine::TaskName;
use crate::errors::{MakedagError, Result};

/// One entry of a resolved plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanStep {
    /// A name without a rule. It has to exist on disk when reached.
    ///
    /// `needed_by` is `None` when the name was requested directly.
    Source {
        path: PathBuf,
        needed_by: Option<TaskName>,
    },
    /// A task whose recipe runs (or is skipped as up to date) at this point.
    Task(TaskName),
}

/// Ordered steps for one invocation.
///
/// Every reachable name appears exactly once, after all of its
/// prerequisites. Siblings keep their declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    pub steps: Vec<PlanStep>,
}

impl Plan {
    /// Resolve `goals` (in order, sharing one visited set) against `graph`.
    pub fn resolve(graph: &DagGraph, goals: &[TaskName]) -> Result<Self> {
        let mut resolver = Resolver {
            graph,
            visited: HashSet::new(),
            in_progress: Vec::new(),
            steps: Vec::new(),
        };

        for goal in goals {
            resolver.visit(goal, None)?;
        }

        Ok(Plan {
            steps: resolver.steps,
        })
    }

    /// Names of the tasks in the plan, in execution order.
    pub fn task_names(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().filter_map(|step| match step {
            PlanStep::Task(name) => Some(name.as_str()),
            PlanStep::Source { .. } => None,
        })
    }
}

struct Resolver<'a> {
    graph: &'a DagGraph,
    visited: HashSet<TaskName>,
    in_progress: Vec<TaskName>,
    steps: Vec<PlanStep>,
}

impl Resolver<'_> {
    fn visit(&mut self, name: &str, needed_by: Option<&str>) -> Result<()> {
        if self.visited.contains(name) {
            return Ok(());
        }
        if self.in_progress.iter().any(|n| n == name) {
            return Err(MakedagError::DagCycle(format!(
                "circular dependency: {} -> {}",
                self.in_progress.join(" -> "),
                name
            )));
        }

        if !self.graph.contains(name) {
            self.visited.insert(name.to_string());
            self.steps.push(PlanStep::Source {
                path: PathBuf::from(name),
                needed_by: needed_by.map(str::to_string),
            });
            return Ok(());
        }

        let graph = self.graph;
        self.in_progress.push(name.to_string());
        for dep in graph.dependencies_of(name) {
            self.visit(dep, Some(name))?;
        }
        self.in_progress.pop();

        self.visited.insert(name.to_string());
        self.steps.push(PlanStep::Task(name.to_string()));
        Ok(())
    }
}

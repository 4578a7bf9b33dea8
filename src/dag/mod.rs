// src/dag/mod.rs

//! Task graph, plan resolution and per-invocation scheduling.
//!
//! - [`graph`] holds the declared tasks and their prerequisites.
//! - [`plan`] turns requested goals into an ordered list of steps.
//! - [`scheduler`] walks that plan and records what happened to each task.
//! - [`task_info`] provides task metadata, recipe lines and run states.

pub mod graph;
pub mod plan;
pub mod scheduler;
pub mod task_info;

pub use graph::DagGraph;
pub use plan::{Plan, PlanStep};
pub use scheduler::Scheduler;
pub use task_info::{RecipeLine, ScheduledLine, TaskInfo, TaskKind, TaskRunState};

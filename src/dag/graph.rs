// src/dag/graph.rs

use indexmap::IndexMap;

use crate::config::model::ConfigFile;

/// Internal node structure: stores immediate deps and dependents.
#[derive(Debug, Clone)]
struct DagNode {
    /// Direct prerequisites, in declaration order. May name plain files.
    deps: Vec<String>,
    /// Direct dependents: tasks that list this one as a prerequisite.
    dependents: Vec<String>,
}

/// In-memory task graph keyed by task name, in declaration order.
///
/// Acyclicity is validated in `config::validate`; here we just keep
/// adjacency information for planning and diagnostics.
#[derive(Debug, Clone)]
pub struct DagGraph {
    nodes: IndexMap<String, DagNode>,
}

impl DagGraph {
    /// Build the graph from a validated [`ConfigFile`].
    pub fn from_config(cfg: &ConfigFile) -> Self {
        let mut nodes: IndexMap<String, DagNode> = cfg
            .task
            .iter()
            .map(|(name, task)| {
                (
                    name.clone(),
                    DagNode {
                        deps: task.deps.clone(),
                        dependents: Vec::new(),
                    },
                )
            })
            .collect();

        let edges: Vec<(String, String)> = nodes
            .iter()
            .flat_map(|(name, node)| node.deps.iter().map(move |dep| (dep.clone(), name.clone())))
            .collect();

        for (dep, dependent) in edges {
            if let Some(dep_node) = nodes.get_mut(&dep) {
                dep_node.dependents.push(dependent);
            }
        }

        Self { nodes }
    }

    /// Whether `name` has a rule (as opposed to being a plain file).
    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Immediate prerequisites of a task.
    pub fn dependencies_of(&self, name: &str) -> &[String] {
        self.nodes
            .get(name)
            .map(|n| n.deps.as_slice())
            .unwrap_or(&[])
    }

    /// Immediate dependents of a task.
    pub fn dependents_of(&self, name: &str) -> &[String] {
        self.nodes
            .get(name)
            .map(|n| n.dependents.as_slice())
            .unwrap_or(&[])
    }
}

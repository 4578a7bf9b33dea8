// src/config/validate.rs

use indexmap::IndexMap;
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::config::model::{normalize_target, ConfigFile, RawConfigFile, TaskConfig};
use crate::config::vars::expand;
use crate::errors::{MakedagError, Result};
use crate::types::RecipeSpec;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::MakedagError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let tasks = normalize_tasks(raw.task);
        validate_config(&tasks, raw.config.default_task.as_deref())?;
        let tasks = expand_recipes(tasks, &raw.vars)?;
        Ok(ConfigFile::new_unchecked(raw.config, raw.vars, tasks))
    }
}

/// Structural checks on a (normalised) task table.
pub fn validate_config(
    tasks: &IndexMap<String, TaskConfig>,
    default_task: Option<&str>,
) -> Result<()> {
    ensure_has_tasks(tasks)?;
    validate_default_task(tasks, default_task)?;
    validate_dag(tasks)?;
    Ok(())
}

fn normalize_tasks(tasks: IndexMap<String, TaskConfig>) -> IndexMap<String, TaskConfig> {
    tasks
        .into_iter()
        .map(|(name, mut task)| {
            task.deps = task.deps.iter().map(|d| normalize_target(d)).collect();
            (normalize_target(&name), task)
        })
        .collect()
}

fn ensure_has_tasks(tasks: &IndexMap<String, TaskConfig>) -> Result<()> {
    if tasks.is_empty() {
        return Err(MakedagError::ConfigError(
            "task files must declare at least one [task.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_default_task(
    tasks: &IndexMap<String, TaskConfig>,
    default_task: Option<&str>,
) -> Result<()> {
    if let Some(name) = default_task {
        if !tasks.contains_key(&normalize_target(name)) {
            return Err(MakedagError::ConfigError(format!(
                "[config].default_task names unknown task '{name}'"
            )));
        }
    }
    Ok(())
}

fn validate_dag(tasks: &IndexMap<String, TaskConfig>) -> Result<()> {
    // Edge direction: dep -> task. Prerequisites without a rule are plain
    // files and cannot take part in a cycle.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for name in tasks.keys() {
        graph.add_node(name.as_str());
    }

    for (name, task) in tasks.iter() {
        for dep in task.deps.iter() {
            if dep == name {
                return Err(MakedagError::DagCycle(format!(
                    "task '{name}' lists itself as a prerequisite"
                )));
            }
            if tasks.contains_key(dep) {
                graph.add_edge(dep.as_str(), name.as_str(), ());
            }
        }
    }

    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => {
            let node = cycle.node_id();
            Err(MakedagError::DagCycle(format!(
                "cycle detected in task graph involving task '{}'",
                node
            )))
        }
    }
}

fn expand_recipes(
    tasks: IndexMap<String, TaskConfig>,
    vars: &IndexMap<String, String>,
) -> Result<IndexMap<String, TaskConfig>> {
    let mut expanded = IndexMap::with_capacity(tasks.len());

    for (name, mut task) in tasks {
        let mut lines = Vec::new();
        for line in task.cmd.lines() {
            let line = expand(&line, vars).map_err(|var| MakedagError::UndefinedVariable {
                task: name.clone(),
                name: var,
            })?;
            lines.push(line);
        }
        task.cmd = RecipeSpec::Lines(lines);
        expanded.insert(name, task);
    }

    Ok(expanded)
}

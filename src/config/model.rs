// src/config/model.rs

use indexmap::IndexMap;
use serde::Deserialize;

use crate::types::{RecipeSpec, TaskKindSpec};

/// One task file exactly as read from TOML, before layering and validation.
///
/// ```toml
/// include = ["Makedag.release.toml"]
///
/// [config]
/// default_task = "test"
///
/// [vars]
/// MAX_LINE_LENGTH = "110"
///
/// [task."env/requirements.built"]
/// kind = "file"
/// deps = ["env", "requirements-dev.txt"]
/// cmd = [
///     "./env/bin/pip install -r requirements-dev.txt",
///     "cp requirements-dev.txt ./env/requirements.built",
/// ]
/// ```
///
/// All sections are optional. Tables keep their declaration order.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    /// Further task files layered on top of this one, relative to this
    /// file's directory.
    #[serde(default)]
    pub include: Vec<String>,

    /// Global behaviour from `[config]`.
    #[serde(default)]
    pub config: ConfigSection,

    /// Variables from `[vars]`, referenced in recipes as `$(NAME)`.
    #[serde(default)]
    pub vars: IndexMap<String, String>,

    /// All tasks from `[task.<name>]`, in declaration order.
    #[serde(default)]
    pub task: IndexMap<String, TaskConfig>,
}

impl RawConfigFile {
    /// Layer `later` on top of `self`.
    ///
    /// A task or variable declared again replaces the earlier value in full;
    /// nothing is merged field by field. Redeclared tasks keep the position
    /// of their first declaration.
    pub fn overlay(&mut self, later: RawConfigFile) {
        self.config.overlay(later.config);
        for (name, value) in later.vars {
            self.vars.insert(name, value);
        }
        for (name, task) in later.task {
            self.task.insert(normalize_target(&name), task);
        }
    }

    /// Apply `NAME=VALUE` overrides from the command line.
    pub fn apply_defines(&mut self, defines: &[(String, String)]) {
        for (name, value) in defines {
            self.vars.insert(name.clone(), value.clone());
        }
    }
}

/// Validated configuration used by the rest of the crate.
///
/// Recipe lines have already had their variables expanded and task names
/// and prerequisites are normalised.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub vars: IndexMap<String, String>,
    pub task: IndexMap<String, TaskConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        config: ConfigSection,
        vars: IndexMap<String, String>,
        task: IndexMap<String, TaskConfig>,
    ) -> Self {
        Self { config, vars, task }
    }

    /// Task run when no goal is given on the command line.
    pub fn default_task(&self) -> Option<&str> {
        self.config
            .default_task
            .as_deref()
            .or_else(|| self.task.keys().next().map(String::as_str))
    }

    /// Shell used to run recipe lines.
    pub fn shell(&self) -> &str {
        self.config.shell.as_deref().unwrap_or(DEFAULT_SHELL)
    }
}

pub const DEFAULT_SHELL: &str = "sh";

/// `[config]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ConfigSection {
    /// Program used to run each recipe line as `<shell> -c <line>`.
    #[serde(default)]
    pub shell: Option<String>,

    /// Goal used when none is given on the command line.
    #[serde(default)]
    pub default_task: Option<String>,
}

impl ConfigSection {
    fn overlay(&mut self, later: ConfigSection) {
        if later.shell.is_some() {
            self.shell = later.shell;
        }
        if later.default_task.is_some() {
            self.default_task = later.default_task;
        }
    }
}

/// `[task.<name>]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TaskConfig {
    /// `"phony"` (default) or `"file"`.
    #[serde(default)]
    pub kind: TaskKindSpec,

    /// Prerequisites: other task names, or paths of files that must exist.
    #[serde(default)]
    pub deps: Vec<String>,

    /// Recipe lines, run in order. `-` marks a line best-effort, `@` keeps
    /// it from being echoed.
    #[serde(default)]
    pub cmd: RecipeSpec,
}

/// Strip a leading `./` so `./env/x` and `env/x` name the same target.
pub fn normalize_target(name: &str) -> String {
    let mut name = name.trim();
    while let Some(rest) = name.strip_prefix("./") {
        name = rest;
    }
    name.to_string()
}

// src/types.rs

use serde::Deserialize;

/// How a task decides whether its recipe has to run.
///
/// - `Phony`: the name is symbolic; the recipe runs every time the task is
///   reached (default).
/// - `File`: the name is a path; the recipe is skipped when that path exists
///   and is not older than any file-valued prerequisite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKindSpec {
    Phony,
    File,
}

impl Default for TaskKindSpec {
    fn default() -> Self {
        TaskKindSpec::Phony
    }
}

/// A recipe given either as a single command string or a list of lines.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RecipeSpec {
    Single(String),
    Lines(Vec<String>),
}

impl Default for RecipeSpec {
    fn default() -> Self {
        RecipeSpec::Lines(Vec::new())
    }
}

impl RecipeSpec {
    pub fn lines(&self) -> Vec<String> {
        match self {
            RecipeSpec::Single(line) => vec![line.clone()],
            RecipeSpec::Lines(lines) => lines.clone(),
        }
    }
}

impl From<Vec<String>> for RecipeSpec {
    fn from(lines: Vec<String>) -> Self {
        RecipeSpec::Lines(lines)
    }
}

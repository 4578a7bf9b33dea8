// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MakedagError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("No task named '{0}' and no such file")]
    TaskNotFound(String),

    #[error("Cycle detected in task graph: {0}")]
    DagCycle(String),

    #[error("Undefined variable '{name}' referenced by task '{task}'")]
    UndefinedVariable { task: String, name: String },

    #[error("No rule to make target '{target}', needed by '{needed_by}'")]
    NoRule { target: String, needed_by: String },

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MakedagError {
    /// Exit status used when the runner itself (not a recipe command) fails.
    pub const EXIT_CODE: i32 = 2;
}

pub type Result<T> = std::result::Result<T, MakedagError>;

// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `makedag`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "makedag",
    version,
    about = "Run build tasks in dependency order, skipping up-to-date file targets.",
    long_about = None
)]
pub struct CliArgs {
    /// Tasks to run, in order. Defaults to `[config].default_task`, or the
    /// first task declared.
    #[arg(value_name = "TASK")]
    pub tasks: Vec<String>,

    /// Task file to load. Repeat to layer several files; a task declared in a
    /// later file replaces the earlier declaration entirely.
    ///
    /// Default: `Makedag.toml` in the working directory.
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    pub files: Vec<PathBuf>,

    /// Change to this directory before loading task files and running.
    #[arg(short = 'C', long, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Override a `[vars]` entry, e.g. `-D MAX_LINE_LENGTH=120`.
    #[arg(short = 'D', long = "define", value_name = "NAME=VALUE", value_parser = parse_define)]
    pub defines: Vec<(String, String)>,

    /// Print the commands that would run, without running them.
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// List the declared tasks and exit.
    #[arg(long)]
    pub list: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `MAKEDAG_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

impl CliArgs {
    /// Task files to load, falling back to the default file name.
    pub fn task_files(&self) -> Vec<PathBuf> {
        if self.files.is_empty() {
            vec![crate::config::loader::default_config_path()]
        } else {
            self.files.clone()
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Parse one `-D NAME=VALUE` argument.
pub fn parse_define(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got '{s}'")),
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

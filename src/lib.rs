// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod types;

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::oneshot;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::config::model::{normalize_target, ConfigFile};
use crate::dag::{DagGraph, Scheduler, TaskInfo, TaskKind};
use crate::engine::{CoreRuntime, InvocationOutcome, Runtime, TaskName};
use crate::errors::{MakedagError, Result};
use crate::exec::{DryRunExecutor, ShellExecutor};
use crate::fs::RealFileSystem;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - task file loading and layering
/// - goal selection
/// - scheduler / core runtime / IO shell
/// - executor (real or dry-run)
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<InvocationOutcome> {
    if let Some(dir) = &args.directory {
        std::env::set_current_dir(dir)?;
        info!(dir = %dir.display(), "changed working directory");
    }

    let cfg = load_and_validate(&args.task_files(), &args.defines)?;

    if args.list {
        let mut stdout = io::stdout().lock();
        write_task_list(&cfg, &mut stdout).context("writing task list")?;
        return Ok(InvocationOutcome::Succeeded);
    }

    let goals = select_goals(&args.tasks, &cfg)?;
    info!(?goals, dry_run = args.dry_run, "starting invocation");

    let core = CoreRuntime::new(Scheduler::from_config(&cfg), goals);
    let fs = Arc::new(RealFileSystem);
    let root = PathBuf::from(".");

    // Ctrl-C → interrupt the running command.
    let (interrupt_tx, interrupt_rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("failed to listen for Ctrl+C: {e}");
            return;
        }
        let _ = interrupt_tx.send(());
    });

    if args.dry_run {
        Runtime::new(core, DryRunExecutor, fs, root)
            .with_interrupt(interrupt_rx)
            .run()
            .await
    } else {
        let executor = ShellExecutor::new(cfg.shell());
        Runtime::new(core, executor, fs, root)
            .with_interrupt(interrupt_rx)
            .run()
            .await
    }
}

/// Goals from the command line, or the default task.
pub fn select_goals(requested: &[String], cfg: &ConfigFile) -> Result<Vec<TaskName>> {
    if !requested.is_empty() {
        return Ok(requested.iter().map(|t| normalize_target(t)).collect());
    }

    let default = cfg.default_task().ok_or_else(|| {
        MakedagError::ConfigError("no task requested and no task declared".to_string())
    })?;
    debug!(task = %default, "no goal given; using default task");
    Ok(vec![normalize_target(default)])
}

/// Process exit status for the result of [`run`].
///
/// Recipe failures exit with the failing command's status; errors of the
/// runner itself exit with [`MakedagError::EXIT_CODE`].
pub fn exit_status(result: &Result<InvocationOutcome>) -> i32 {
    match result {
        Ok(outcome) => outcome.exit_code(),
        Err(_) => MakedagError::EXIT_CODE,
    }
}

/// `--list` output: tasks, kinds, prerequisites and expanded recipes.
pub fn write_task_list(cfg: &ConfigFile, out: &mut impl Write) -> io::Result<()> {
    let graph = DagGraph::from_config(cfg);

    writeln!(out, "makedag tasks ({}):", cfg.task.len())?;
    if let Some(default) = cfg.default_task() {
        writeln!(out, "  default: {default}")?;
    }
    writeln!(out)?;

    for (name, tc) in cfg.task.iter() {
        let info = TaskInfo::from_config(name.clone(), tc, cfg);
        match &info.kind {
            TaskKind::Phony => writeln!(out, "  - {name}")?,
            TaskKind::File { .. } => writeln!(out, "  - {name} (file)")?,
        }
        if !info.deps.is_empty() {
            writeln!(out, "      deps: {}", info.deps.join(", "))?;
        }
        let dependents = graph.dependents_of(name);
        if !dependents.is_empty() {
            writeln!(out, "      needed by: {}", dependents.join(", "))?;
        }
        for line in &info.recipe {
            let mut prefix = String::new();
            if line.ignore_errors {
                prefix.push('-');
            }
            if line.silent {
                prefix.push('@');
            }
            writeln!(out, "      cmd: {prefix}{}", line.command)?;
        }
    }

    debug!("task listing complete (no execution)");
    Ok(())
}

// src/exec/command.rs

//! Recipe line runner backed by real child processes.

use std::future::Future;
use std::io::Write;
use std::path::PathBuf;
use std::pin::Pin;
use std::process::Stdio;

use anyhow::Context;
use tokio::process::Command;
use tracing::{debug, info};

use crate::dag::ScheduledLine;
use crate::engine::LineOutcome;
use crate::errors::Result;
use crate::exec::ExecutorBackend;

/// Runs each recipe line as `<shell> -c <line>` and waits for it.
///
/// The child inherits stdin/stdout/stderr so tools print straight to the
/// terminal. Unless the line is silent (`@`), the command is echoed to
/// stdout first.
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    shell: String,
    current_dir: Option<PathBuf>,
    echo: bool,
}

impl ShellExecutor {
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
            current_dir: None,
            echo: true,
        }
    }

    /// Run commands in `dir` instead of the process working directory.
    pub fn with_current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Disable echoing of commands.
    pub fn quiet(mut self) -> Self {
        self.echo = false;
        self
    }

    fn command_for(&self, line: &str) -> Command {
        let flag = if cfg!(windows) && self.shell.eq_ignore_ascii_case("cmd") {
            "/C"
        } else {
            "-c"
        };

        let mut cmd = Command::new(&self.shell);
        cmd.arg(flag).arg(line);
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }
        cmd.stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        cmd
    }
}

impl ExecutorBackend for ShellExecutor {
    fn run_line(
        &mut self,
        scheduled: ScheduledLine,
    ) -> Pin<Box<dyn Future<Output = Result<LineOutcome>> + Send + '_>> {
        Box::pin(async move {
            let line = &scheduled.line;

            if self.echo && !line.silent {
                let mut stdout = std::io::stdout().lock();
                writeln!(stdout, "{}", line.command).context("echoing recipe line")?;
                stdout.flush().context("flushing stdout")?;
            }

            debug!(
                task = %scheduled.task,
                line = scheduled.index,
                cmd = %line.command,
                "starting recipe line"
            );

            // `status()` owns the child; dropping this future kills it.
            let status = self
                .command_for(&line.command)
                .status()
                .await
                .with_context(|| {
                    format!(
                        "spawning `{}` for task '{}'",
                        self.shell, scheduled.task
                    )
                })?;

            let outcome = if status.success() {
                LineOutcome::Success
            } else {
                LineOutcome::Failed(status.code().unwrap_or(1))
            };

            info!(
                task = %scheduled.task,
                line = scheduled.index,
                exit_code = status.code(),
                success = status.success(),
                "recipe line exited"
            );

            Ok(outcome)
        })
    }
}

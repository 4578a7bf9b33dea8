// src/engine/runtime.rs

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;
use tracing::{debug, info, warn};

use crate::dag::ScheduledLine;
use crate::engine::freshness;
use crate::errors::Result;
use crate::exec::ExecutorBackend;
use crate::fs::FileSystem;

use super::core::CoreRuntime;
use super::{CoreCommand, InvocationOutcome, RuntimeEvent};

/// Drives the pure [`CoreRuntime`] by performing the commands it returns.
///
/// This is the IO shell: it stats files through a [`FileSystem`], runs recipe
/// lines through an [`ExecutorBackend`], and turns an interrupt signal into
/// a `RuntimeEvent::Interrupted`. All semantics live in the core.
pub struct Runtime<E: ExecutorBackend> {
    core: CoreRuntime,
    executor: E,
    fs: Arc<dyn FileSystem>,
    /// Directory that relative target paths are resolved against.
    root: PathBuf,
    /// Fires when the user interrupts the invocation.
    interrupt: Option<oneshot::Receiver<()>>,
}

impl<E: ExecutorBackend> fmt::Debug for Runtime<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl<E: ExecutorBackend> Runtime<E> {
    pub fn new(
        core: CoreRuntime,
        executor: E,
        fs: Arc<dyn FileSystem>,
        root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            core,
            executor,
            fs,
            root: root.into(),
            interrupt: None,
        }
    }

    /// Attach an interrupt signal (Ctrl-C in production).
    pub fn with_interrupt(mut self, interrupt: oneshot::Receiver<()>) -> Self {
        self.interrupt = Some(interrupt);
        self
    }

    pub fn core(&self) -> &CoreRuntime {
        &self.core
    }

    /// Main loop.
    ///
    /// - Feeds one event into the core and gets one command back.
    /// - Performs the command, producing the next event.
    /// - Stops at `CoreCommand::Finish`.
    pub async fn run(&mut self) -> Result<InvocationOutcome> {
        info!("makedag runtime started");

        let mut event = RuntimeEvent::Started;

        loop {
            debug!(?event, "runtime received event");

            let command = self.core.step(event)?;

            event = match command {
                CoreCommand::Finish(outcome) => {
                    debug_assert!(self.core.state().is_terminal());
                    info!(?outcome, "invocation finished");
                    return Ok(outcome);
                }
                CoreCommand::RemovePartialTarget {
                    task,
                    target,
                    previous_mtime,
                } => {
                    self.remove_partial_target(&task, &target, previous_mtime)?;
                    RuntimeEvent::CleanupFinished
                }
                _ if self.interrupt_pending() => RuntimeEvent::Interrupted,
                CoreCommand::CheckSource { path, .. } => {
                    let exists = self.fs.exists(&self.root.join(&path));
                    RuntimeEvent::SourceChecked { path, exists }
                }
                CoreCommand::CheckFreshness {
                    task,
                    target,
                    inputs,
                } => {
                    let check = freshness::evaluate(self.fs.as_ref(), &self.root, &target, &inputs)?;
                    RuntimeEvent::FreshnessChecked { task, check }
                }
                CoreCommand::RunLine(line) => self.run_line(line).await?,
            };
        }
    }

    /// Run one line, racing it against the interrupt signal.
    ///
    /// On interrupt the executor future is dropped, which kills the child.
    async fn run_line(&mut self, line: ScheduledLine) -> Result<RuntimeEvent> {
        let task = line.task.clone();
        let mut running = self.executor.run_line(line);

        loop {
            let Some(interrupt) = self.interrupt.as_mut() else {
                let outcome = running.await?;
                return Ok(RuntimeEvent::LineCompleted { task, outcome });
            };

            let interrupted = tokio::select! {
                result = &mut running => {
                    return Ok(RuntimeEvent::LineCompleted { task, outcome: result? });
                }
                signal = interrupt => signal.is_ok(),
            };

            // Either way the receiver is spent; a closed sender means no
            // interrupt can arrive any more.
            self.interrupt = None;

            if interrupted {
                info!(task = %task, "interrupt received; stopping running command");
                return Ok(RuntimeEvent::Interrupted);
            }
        }
    }

    fn interrupt_pending(&mut self) -> bool {
        let Some(interrupt) = self.interrupt.as_mut() else {
            return false;
        };

        match interrupt.try_recv() {
            Ok(()) => {
                self.interrupt = None;
                true
            }
            Err(TryRecvError::Closed) => {
                self.interrupt = None;
                false
            }
            Err(TryRecvError::Empty) => false,
        }
    }

    /// Delete `target` if the interrupted recipe created or modified it.
    fn remove_partial_target(
        &self,
        task: &str,
        target: &Path,
        previous_mtime: Option<SystemTime>,
    ) -> Result<()> {
        let path = self.root.join(target);
        let current = self.fs.modified(&path)?;

        if current.is_some() && current != previous_mtime {
            warn!(
                task = %task,
                target = %target.display(),
                "deleting partially built target after interrupt"
            );
            self.fs.remove(&path)?;
        }

        Ok(())
    }
}

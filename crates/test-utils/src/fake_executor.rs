use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use makedag::dag::ScheduledLine;
use makedag::engine::LineOutcome;
use makedag::errors::Result;
use makedag::exec::ExecutorBackend;
use makedag::fs::mock::MockFileSystem;

/// A fake executor that:
/// - records every command it was asked to run, in order
/// - fails commands containing a configured substring with a given code
/// - optionally "touches" a path in a [`MockFileSystem`] when a command
///   containing a substring succeeds, standing in for the real side effect.
#[derive(Debug, Clone, Default)]
pub struct FakeExecutor {
    executed: Arc<Mutex<Vec<String>>>,
    failures: Vec<(String, i32)>,
    effects: Vec<(String, PathBuf)>,
    fs: Option<MockFileSystem>,
}

impl FakeExecutor {
    pub fn new(executed: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            executed,
            ..Self::default()
        }
    }

    /// Commands containing `needle` exit with `code`.
    pub fn failing(mut self, needle: &str, code: i32) -> Self {
        self.failures.push((needle.to_string(), code));
        self
    }

    /// Successful commands containing `needle` touch `path` in `fs`.
    pub fn touching(mut self, fs: &MockFileSystem, needle: &str, path: &str) -> Self {
        self.fs = Some(fs.clone());
        self.effects.push((needle.to_string(), PathBuf::from(path)));
        self
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

impl ExecutorBackend for FakeExecutor {
    fn run_line(
        &mut self,
        line: ScheduledLine,
    ) -> Pin<Box<dyn Future<Output = Result<LineOutcome>> + Send + '_>> {
        Box::pin(async move {
            let command = line.line.command.clone();
            self.executed.lock().unwrap().push(command.clone());

            if let Some((_, code)) = self
                .failures
                .iter()
                .find(|(needle, _)| command.contains(needle.as_str()))
            {
                return Ok(LineOutcome::Failed(*code));
            }

            if let Some(fs) = &self.fs {
                for (needle, path) in &self.effects {
                    if command.contains(needle.as_str()) {
                        fs.touch(path);
                    }
                }
            }

            Ok(LineOutcome::Success)
        })
    }
}

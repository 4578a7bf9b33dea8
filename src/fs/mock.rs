// src/fs/mock.rs

use super::FileSystem;
use anyhow::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

/// In-memory filesystem that only tracks paths and modification times.
///
/// Time is a logical clock: every `touch` is one second later than the
/// previous one, so ordering between files is deterministic in tests.
/// Clones share the same underlying state.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Debug, Default)]
struct MockState {
    files: HashMap<PathBuf, SystemTime>,
    tick: u64,
}

impl MockState {
    fn next_time(&mut self) -> SystemTime {
        self.tick += 1;
        SystemTime::UNIX_EPOCH + Duration::from_secs(self.tick)
    }
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or update `path`, making it the newest file so far.
    pub fn touch(&self, path: impl AsRef<Path>) {
        let mut state = self.inner.lock().unwrap();
        let now = state.next_time();
        state.files.insert(path.as_ref().to_path_buf(), now);
    }

    /// Set an explicit modification time.
    pub fn set_modified(&self, path: impl AsRef<Path>, mtime: SystemTime) {
        let mut state = self.inner.lock().unwrap();
        state.files.insert(path.as_ref().to_path_buf(), mtime);
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        let state = self.inner.lock().unwrap();
        state.files.contains_key(path)
            || state.files.keys().any(|p| p.starts_with(path))
    }

    fn modified(&self, path: &Path) -> Result<Option<SystemTime>> {
        let state = self.inner.lock().unwrap();
        Ok(state.files.get(path).copied())
    }

    fn remove(&self, path: &Path) -> Result<()> {
        let mut state = self.inner.lock().unwrap();
        state.files.retain(|p, _| !p.starts_with(path));
        Ok(())
    }
}

// src/engine/freshness.rs

//! Staleness check for file-backed tasks.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::debug;

use crate::errors::Result;
use crate::fs::FileSystem;

/// Why a file target has to be rebuilt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaleReason {
    TargetMissing,
    /// An input is missing (typically a file task whose recipe did not
    /// produce its file).
    InputMissing(PathBuf),
    /// An input was modified after the target.
    InputNewer(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Freshness {
    UpToDate,
    Stale(StaleReason),
}

/// Result of checking one target against its inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreshnessCheck {
    pub verdict: Freshness,
    /// Modification time of the target before its recipe runs, if it exists.
    pub target_mtime: Option<SystemTime>,
}

/// Compare `target` with every path in `inputs`.
///
/// The target is up to date when it exists and no input is strictly newer.
/// Paths are resolved against `root`.
pub fn evaluate(
    fs: &dyn FileSystem,
    root: &Path,
    target: &Path,
    inputs: &[PathBuf],
) -> Result<FreshnessCheck> {
    let target_mtime = fs.modified(&root.join(target))?;

    let Some(target_time) = target_mtime else {
        return Ok(FreshnessCheck {
            verdict: Freshness::Stale(StaleReason::TargetMissing),
            target_mtime,
        });
    };

    for input in inputs {
        let verdict = match fs.modified(&root.join(input))? {
            None => Some(StaleReason::InputMissing(input.clone())),
            Some(input_time) if input_time > target_time => {
                Some(StaleReason::InputNewer(input.clone()))
            }
            Some(_) => None,
        };

        if let Some(reason) = verdict {
            debug!(target = %target.display(), ?reason, "target is stale");
            return Ok(FreshnessCheck {
                verdict: Freshness::Stale(reason),
                target_mtime,
            });
        }
    }

    Ok(FreshnessCheck {
        verdict: Freshness::UpToDate,
        target_mtime,
    })
}

// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{MakedagError, Result};

/// Load a single task file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization. It does **not** follow
/// `include`, layer anything or validate. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| {
        MakedagError::ConfigError(format!("reading task file {}: {e}", path.display()))
    })?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load every layer in order, following `include` lists, and overlay them.
///
/// Layer order is: each file, then (recursively) the files it includes, then
/// the next file given. A task declared in a later layer replaces the
/// earlier declaration in full.
pub fn load_layers(paths: &[PathBuf]) -> Result<RawConfigFile> {
    let mut merged = RawConfigFile::default();
    let mut chain = Vec::new();

    for path in paths {
        load_layer_into(path, &mut merged, &mut chain)?;
    }

    Ok(merged)
}

fn load_layer_into(
    path: &Path,
    merged: &mut RawConfigFile,
    chain: &mut Vec<PathBuf>,
) -> Result<()> {
    let identity = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    if chain.contains(&identity) {
        return Err(MakedagError::ConfigError(format!(
            "task file {} includes itself",
            path.display()
        )));
    }

    let mut layer = load_from_path(path)?;
    let includes = std::mem::take(&mut layer.include);

    debug!(
        file = %path.display(),
        tasks = layer.task.len(),
        includes = includes.len(),
        "loaded task file layer"
    );

    merged.overlay(layer);

    chain.push(identity);
    let base = path.parent().unwrap_or_else(|| Path::new(""));
    for include in includes {
        load_layer_into(&base.join(include), merged, chain)?;
    }
    chain.pop();

    Ok(())
}

/// Load all layers, apply command-line variable overrides and validate.
///
/// This is the recommended entry point for the rest of the application:
///
/// - Reads and layers the TOML files.
/// - Applies `--define` overrides on top of `[vars]`.
/// - Checks for:
///   - an empty task table,
///   - an unknown `default_task`,
///   - dependency cycles,
///   - undefined variables in recipes.
pub fn load_and_validate(paths: &[PathBuf], defines: &[(String, String)]) -> Result<ConfigFile> {
    let mut raw_config = load_layers(paths)?;
    raw_config.apply_defines(defines);
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Task file used when none is given on the command line.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Makedag.toml")
}

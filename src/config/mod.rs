// src/config/mod.rs

//! Task file loading and validation for makedag.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load and layer task files from disk (`loader.rs`).
//! - Expand `$(NAME)` variables in recipes (`vars.rs`).
//! - Validate basic invariants like an acyclic task graph (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;
pub mod vars;

pub use loader::{load_and_validate, load_from_path, load_layers};
pub use model::{normalize_target, ConfigFile, ConfigSection, RawConfigFile, TaskConfig};
pub use validate::validate_config;

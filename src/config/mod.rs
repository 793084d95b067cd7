// src/config/mod.rs

//! Project configuration for taskdag.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk and locate the tasks directory (`loader.rs`).
//! - Validate the raw model (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, find_tasks_dir, load_and_validate, load_from_path, load_or_default};
pub use model::{LayeringSection, PathsSection, ProjectConfig, RawProjectConfig, RecordsSection};

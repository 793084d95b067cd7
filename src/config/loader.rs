// src/config/loader.rs

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ProjectConfig, RawProjectConfig};
use crate::errors::{Result, TaskdagError};
use crate::fs::FileSystem;

/// Load a configuration file and return the raw, unvalidated model.
pub fn load_from_path(fs: &impl FileSystem, path: impl AsRef<Path>) -> Result<RawProjectConfig> {
    let path = path.as_ref();
    let contents = fs.read_to_string(path)?;

    let config: RawProjectConfig = toml::from_str(&contents)?;

    Ok(config)
}

/// Load and validate a configuration file.
///
/// Relative paths inside it are anchored at the file's directory.
pub fn load_and_validate(fs: &impl FileSystem, path: impl AsRef<Path>) -> Result<ProjectConfig> {
    let path = path.as_ref();
    let raw_config = load_from_path(fs, path)?;
    let config = ProjectConfig::try_from(raw_config)?;
    Ok(config.with_base_dir(config_dir(path)))
}

/// Like [`load_and_validate`], but a missing file at the default location
/// yields the default configuration. A missing file that was asked for
/// explicitly is still an error.
pub fn load_or_default(
    fs: &impl FileSystem,
    path: impl AsRef<Path>,
    explicit: bool,
) -> Result<ProjectConfig> {
    let path = path.as_ref();
    if !explicit && !fs.exists(path) {
        debug!(path = ?path, "no config file; using defaults");
        return Ok(ProjectConfig::default().with_base_dir(config_dir(path)));
    }
    load_and_validate(fs, path)
}

/// `Taskdag.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Taskdag.toml")
}

/// Directory of the config file; `.` for a bare file name.
fn config_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Directory names searched under the project root, in order.
pub const TASKS_DIR_CANDIDATES: [&str; 2] = ["Tasks", "Task"];

/// Locate the directory holding task records.
///
/// An explicit directory (`override_dir`, else `[paths].tasks`) must exist.
/// Otherwise the first existing of `<root>/Tasks`, `<root>/Task` is used.
pub fn find_tasks_dir(
    fs: &impl FileSystem,
    cfg: &ProjectConfig,
    override_dir: Option<&Path>,
) -> Result<PathBuf> {
    let explicit = override_dir
        .map(Path::to_path_buf)
        .or_else(|| cfg.configured_tasks_dir());

    if let Some(dir) = explicit {
        if fs.is_dir(&dir) {
            return Ok(dir);
        }
        return Err(TaskdagError::TasksDirNotFound(format!(
            "{:?} is not a directory",
            dir
        )));
    }

    let root = cfg.project_root();
    let candidates: Vec<PathBuf> = TASKS_DIR_CANDIDATES
        .iter()
        .map(|name| root.join(name))
        .collect();

    for dir in &candidates {
        if fs.is_dir(dir) {
            debug!(dir = ?dir, "found tasks directory");
            return Ok(dir.clone());
        }
    }

    Err(TaskdagError::TasksDirNotFound(format!(
        "none of {} exists",
        candidates
            .iter()
            .map(|p| format!("{:?}", p))
            .collect::<Vec<_>>()
            .join(", ")
    )))
}

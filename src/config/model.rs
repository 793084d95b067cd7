// src/config/model.rs

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::record::DEFAULT_EXTENSION;

/// Project configuration as read from `Taskdag.toml`.
///
/// ```toml
/// [paths]
/// project_root = "."
/// tasks = "Tasks"
///
/// [records]
/// extension = "json"
///
/// [layering]
/// detect_cycles = true
/// ```
///
/// Every section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawProjectConfig {
    #[serde(default)]
    pub paths: PathsSection,

    #[serde(default)]
    pub records: RecordsSection,

    #[serde(default)]
    pub layering: LayeringSection,
}

/// `[paths]` section. Relative paths are taken from the config file's directory.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsSection {
    #[serde(default)]
    pub project_root: Option<PathBuf>,

    /// Explicit tasks directory, relative to `project_root`. When unset the
    /// directory is discovered (`Tasks/`, then `Task/`).
    #[serde(default)]
    pub tasks: Option<PathBuf>,
}

/// `[records]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordsSection {
    /// Record file extension, without the dot.
    #[serde(default = "default_extension")]
    pub extension: String,
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

impl Default for RecordsSection {
    fn default() -> Self {
        Self {
            extension: default_extension(),
        }
    }
}

/// `[layering]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct LayeringSection {
    /// Report tasks stuck behind a dependency cycle after layering.
    #[serde(default = "default_detect_cycles")]
    pub detect_cycles: bool,
}

fn default_detect_cycles() -> bool {
    true
}

impl Default for LayeringSection {
    fn default() -> Self {
        Self {
            detect_cycles: default_detect_cycles(),
        }
    }
}

/// Validated configuration. Build it with `ProjectConfig::try_from(raw)`.
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    pub paths: PathsSection,
    pub records: RecordsSection,
    pub layering: LayeringSection,
    base_dir: PathBuf,
}

impl ProjectConfig {
    pub(crate) fn new_unchecked(raw: RawProjectConfig) -> Self {
        Self {
            paths: raw.paths,
            records: raw.records,
            layering: raw.layering,
            base_dir: PathBuf::from("."),
        }
    }

    /// Anchor relative paths at `dir` (normally the config file's directory).
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn project_root(&self) -> PathBuf {
        match &self.paths.project_root {
            Some(root) => self.base_dir.join(root),
            None => self.base_dir.clone(),
        }
    }

    /// Configured tasks directory, if one was set explicitly.
    pub fn configured_tasks_dir(&self) -> Option<PathBuf> {
        self.paths
            .tasks
            .as_ref()
            .map(|tasks| self.project_root().join(tasks))
    }
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self::new_unchecked(RawProjectConfig::default())
    }
}

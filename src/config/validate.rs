// src/config/validate.rs

use crate::config::model::{ProjectConfig, RawProjectConfig};
use crate::errors::{Result, TaskdagError};

impl TryFrom<RawProjectConfig> for ProjectConfig {
    type Error = crate::errors::TaskdagError;

    fn try_from(raw: RawProjectConfig) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ProjectConfig::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawProjectConfig) -> Result<()> {
    validate_records(cfg)?;
    validate_paths(cfg)?;
    Ok(())
}

fn validate_records(cfg: &RawProjectConfig) -> Result<()> {
    let ext = &cfg.records.extension;
    if ext.trim().is_empty() {
        return Err(TaskdagError::ConfigError(
            "[records].extension must not be empty".to_string(),
        ));
    }
    if ext.contains('.') || ext.contains('/') || ext.contains('\\') {
        return Err(TaskdagError::ConfigError(format!(
            "[records].extension must be a bare extension like \"json\" (got '{}')",
            ext
        )));
    }
    Ok(())
}

fn validate_paths(cfg: &RawProjectConfig) -> Result<()> {
    if let Some(tasks) = &cfg.paths.tasks {
        if tasks.as_os_str().is_empty() {
            return Err(TaskdagError::ConfigError(
                "[paths].tasks must not be empty when set".to_string(),
            ));
        }
    }
    if let Some(root) = &cfg.paths.project_root {
        if root.as_os_str().is_empty() {
            return Err(TaskdagError::ConfigError(
                "[paths].project_root must not be empty when set".to_string(),
            ));
        }
    }
    Ok(())
}

// src/errors.rs

//! Crate-wide error types.
//!
//! Only failures that must reach the caller live here. Conditions the graph
//! build recovers from (bad records, unresolved references, cycles) are
//! reported through the `*Report` structs in [`crate::dag`] instead.

use std::path::PathBuf;

use thiserror::Error;

/// Failures of a single record read or write.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("task record '{key}' not found at {path:?}")]
    NotFound { key: String, path: PathBuf },

    #[error("task record at {path:?} is not a valid document: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("could not serialize task record '{key}': {source}")]
    Serialize {
        key: String,
        source: serde_json::Error,
    },

    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum TaskdagError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Tasks directory not found: {0}")]
    TasksDirNotFound(String),

    #[error("Task not found: {0}")]
    NodeNotFound(String),

    #[error("Task cannot depend on itself: {0}")]
    SelfDependency(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, TaskdagError>;

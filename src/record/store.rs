// src/record/store.rs

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::errors::StoreError;
use crate::fs::{FileSystem, RealFileSystem};
use crate::record::model::TaskRecord;

/// Default record file extension.
pub const DEFAULT_EXTENSION: &str = "json";

/// File-per-record storage rooted at a tasks directory.
///
/// A record's key is its file stem: `Tasks/EEEE1.json` has key `EEEE1`.
#[derive(Debug, Clone)]
pub struct RecordStore<F: FileSystem = RealFileSystem> {
    fs: F,
    dir: PathBuf,
    extension: String,
}

impl RecordStore<RealFileSystem> {
    /// Store backed by the real filesystem.
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Self::with_fs(RealFileSystem, dir)
    }
}

impl<F: FileSystem> RecordStore<F> {
    pub fn with_fs(fs: F, dir: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            dir: dir.into(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    /// Use a different record extension (without the leading dot).
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Canonical on-disk location for `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.{}", self.extension))
    }

    /// Key (file stem) for a record path, if the path names a record file.
    pub fn key_for(&self, path: &Path) -> Option<String> {
        let ext = path.extension()?.to_str()?;
        if !ext.eq_ignore_ascii_case(&self.extension) {
            return None;
        }
        path.file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
    }

    /// Read the record stored under `key`.
    pub fn read(&self, key: &str) -> Result<TaskRecord, StoreError> {
        self.read_at(&self.path_for(key))
    }

    /// Overwrite the record stored under `key`.
    pub fn write(&self, key: &str, record: &TaskRecord) -> Result<(), StoreError> {
        self.write_at(key, &self.path_for(key), record)
    }

    /// Read a record from an explicit path inside the store.
    pub fn read_at(&self, path: &Path) -> Result<TaskRecord, StoreError> {
        let contents = self.read_text(path)?;
        serde_json::from_str(&contents).map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Full overwrite of the record at `path`.
    pub fn write_at(&self, key: &str, path: &Path, record: &TaskRecord) -> Result<(), StoreError> {
        self.write_json(key, path, record)
    }

    /// Read the record at `path` as an untyped JSON object.
    ///
    /// Only content that is not a JSON object is rejected; field types are
    /// left for the caller to interpret.
    pub fn read_document(&self, path: &Path) -> Result<Map<String, Value>, StoreError> {
        let contents = self.read_text(path)?;
        serde_json::from_str(&contents).map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Overwrite the record at `path` with `document`, keeping its field order.
    pub fn write_document(
        &self,
        key: &str,
        path: &Path,
        document: &Map<String, Value>,
    ) -> Result<(), StoreError> {
        self.write_json(key, path, document)
    }

    fn read_text(&self, path: &Path) -> Result<String, StoreError> {
        self.fs.read_to_string(path).map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                StoreError::NotFound {
                    key: stem_of(path),
                    path: path.to_path_buf(),
                }
            } else {
                StoreError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })
    }

    /// 2-space pretty JSON plus a trailing newline.
    fn write_json<T: Serialize>(&self, key: &str, path: &Path, value: &T) -> Result<(), StoreError> {
        let mut body =
            serde_json::to_string_pretty(value).map_err(|source| StoreError::Serialize {
                key: key.to_string(),
                source,
            })?;
        body.push('\n');

        self.fs
            .write(path, body.as_bytes())
            .map_err(|source| StoreError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        debug!(key = %key, path = ?path, "wrote task record");
        Ok(())
    }

    /// All record files in the directory, sorted by file name.
    pub fn list(&self) -> Result<Vec<(String, PathBuf)>, StoreError> {
        let entries = self.fs.read_dir(&self.dir).map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                StoreError::NotFound {
                    key: String::new(),
                    path: self.dir.clone(),
                }
            } else {
                StoreError::Io {
                    path: self.dir.clone(),
                    source,
                }
            }
        })?;

        let mut records: Vec<(String, PathBuf)> = entries
            .into_iter()
            .filter(|path| !self.fs.is_dir(path))
            .filter_map(|path| self.key_for(&path).map(|key| (key, path)))
            .collect();

        records.sort_by(|a, b| a.1.file_name().cmp(&b.1.file_name()));
        Ok(records)
    }
}

fn stem_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

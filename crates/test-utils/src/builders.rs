#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tempfile::TempDir;

use taskdag::record::{RecordId, RecordStore, TaskRecord, Update};

/// Builder for `TaskRecord` to simplify test setup.
pub struct RecordBuilder {
    record: TaskRecord,
}

impl RecordBuilder {
    pub fn new(task: &str) -> Self {
        Self {
            record: TaskRecord {
                task: task.to_string(),
                ..TaskRecord::default()
            },
        }
    }

    pub fn description(mut self, text: &str) -> Self {
        self.record.description = text.to_string();
        self
    }

    pub fn group(mut self, group: &str) -> Self {
        self.record.group = Some(group.to_string());
        self
    }

    pub fn id(mut self, id: u64) -> Self {
        self.record.id = Some(RecordId::from(id));
        self
    }

    pub fn owner(mut self, owner: &str) -> Self {
        self.record.owner = owner.to_string();
        self
    }

    pub fn depends_on(mut self, reference: &str) -> Self {
        self.record.depends_on.push(reference.to_string());
        self
    }

    pub fn update(mut self, update: Update) -> Self {
        self.record.updates.push(update);
        self
    }

    pub fn build(self) -> TaskRecord {
        self.record
    }
}

/// A temporary tasks directory populated with record files.
///
/// The directory is removed when the fixture is dropped.
pub struct TaskDirFixture {
    dir: TempDir,
}

impl TaskDirFixture {
    pub fn new() -> Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// `<dir>/<key>.json`
    pub fn record_path(&self, key: &str) -> PathBuf {
        self.path().join(format!("{key}.json"))
    }

    /// Write `record` as `<key>.json`, pretty-printed.
    pub fn write_record(&self, key: &str, record: &TaskRecord) -> Result<()> {
        let body = serde_json::to_string_pretty(record)?;
        fs::write(self.record_path(key), body)?;
        Ok(())
    }

    pub fn with_record(self, key: &str, record: TaskRecord) -> Result<Self> {
        self.write_record(key, &record)?;
        Ok(self)
    }

    /// Write arbitrary bytes under `file_name` (for malformed records etc.).
    pub fn write_raw(&self, file_name: &str, contents: &str) -> Result<()> {
        fs::write(self.path().join(file_name), contents)?;
        Ok(())
    }

    pub fn read_bytes(&self, key: &str) -> Result<Vec<u8>> {
        Ok(fs::read(self.record_path(key))?)
    }

    /// Store over the real filesystem rooted at this directory.
    pub fn store(&self) -> RecordStore {
        RecordStore::open(self.path())
    }
}

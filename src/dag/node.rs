// src/dag/node.rs

//! In-memory task node.

use std::path::PathBuf;

use serde_json::{Map, Value};

use crate::record::model::{RecordId, group_from_value, group_id_reference, string_list};
use crate::types::NodeKey;

/// One loaded task plus its derived graph fields.
///
/// `resolved_deps`, `children` and `level` are owned by the resolver and the
/// layering pass; everything else comes from the record.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskNode {
    pub key: NodeKey,
    /// Display name; the record's `task` field, or `key` when that is empty.
    pub label: String,
    pub file_path: PathBuf,
    pub group: Option<String>,
    /// Id text as written in the record (`"007"` stays `"007"`).
    pub id: Option<String>,
    /// Dependency strings as stored on disk.
    pub raw_deps: Vec<String>,

    /// Keys this node depends on, in resolution order, without repeats.
    pub resolved_deps: Vec<NodeKey>,
    /// Keys of nodes that depend on this one.
    pub children: Vec<NodeKey>,
    /// Layout layer. Meaningless until levels are computed.
    pub level: usize,
}

impl TaskNode {
    pub fn new(key: impl Into<NodeKey>, file_path: impl Into<PathBuf>) -> Self {
        let key = key.into();
        Self {
            label: key.clone(),
            key,
            file_path: file_path.into(),
            group: None,
            id: None,
            raw_deps: Vec::new(),
            resolved_deps: Vec::new(),
            children: Vec::new(),
            level: 0,
        }
    }

    /// Build a node from a record document.
    ///
    /// Only `task`, `group`, `id` and `depends_on` are read; every other
    /// field, and any value of an unexpected type, is ignored.
    pub fn from_document(
        key: impl Into<NodeKey>,
        file_path: impl Into<PathBuf>,
        document: &Map<String, Value>,
    ) -> Self {
        let mut node = Self::new(key, file_path);
        if let Some(task) = document.get("task").and_then(Value::as_str) {
            if !task.is_empty() {
                node.label = task.to_string();
            }
        }
        node.group = document.get("group").and_then(group_from_value);
        node.id = document
            .get("id")
            .and_then(RecordId::from_value)
            .map(|id| id.to_string());
        node.raw_deps = document
            .get("depends_on")
            .map(string_list)
            .unwrap_or_default();
        node
    }

    /// `group+id` form, e.g. `"EEEE1"`, when both parts are present.
    pub fn group_id(&self) -> Option<String> {
        group_id_reference(self.group.as_deref(), self.id.as_deref())
    }

    /// The string written to disk when another node comes to depend on this one.
    pub fn canonical_reference(&self) -> String {
        self.group_id().unwrap_or_else(|| self.key.clone())
    }

    pub fn depends_on(&self, key: &str) -> bool {
        self.resolved_deps.iter().any(|k| k == key)
    }
}

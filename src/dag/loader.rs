// src/dag/loader.rs

use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::dag::graph::TaskGraph;
use crate::dag::node::TaskNode;
use crate::errors::StoreError;
use crate::fs::FileSystem;
use crate::record::RecordStore;
use crate::types::NodeKey;

/// A record file that could not be turned into a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    pub path: PathBuf,
    pub reason: String,
}

/// Recoverable problems found while loading.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub skipped: Vec<SkippedRecord>,
    /// Keys loaded more than once; the later file won.
    pub duplicate_keys: Vec<NodeKey>,
}

/// Load every record in the store into a fresh graph.
///
/// Files are visited in file-name order. A file that cannot be read or is
/// not a JSON object is skipped with a warning; only failing to list the directory
/// itself is an error. Derived fields are left empty.
pub fn load_task_nodes<F: FileSystem>(
    store: &RecordStore<F>,
) -> Result<(TaskGraph, LoadReport), StoreError> {
    let mut graph = TaskGraph::new();
    let mut report = LoadReport::default();

    for (key, path) in store.list()? {
        let document = match store.read_document(&path) {
            Ok(document) => document,
            Err(e) => {
                warn!(path = ?path, error = %e, "could not read task record; skipping");
                report.skipped.push(SkippedRecord {
                    path,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let node = TaskNode::from_document(key.clone(), path, &document);
        debug!(key = %node.key, label = %node.label, deps = ?node.raw_deps, "loaded task");

        if let Some(previous) = graph.insert(node) {
            warn!(
                key = %key,
                replaced = ?previous.file_path,
                "duplicate task key; later record replaces the earlier one"
            );
            report.duplicate_keys.push(key);
        }
    }

    info!(count = graph.len(), dir = ?store.dir(), "loaded tasks");
    Ok((graph, report))
}

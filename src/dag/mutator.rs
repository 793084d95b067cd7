// src/dag/mutator.rs

use std::path::PathBuf;

use serde_json::Value;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{debug, info, warn};

use crate::dag::cycles::would_create_cycle;
use crate::dag::graph::TaskGraph;
use crate::errors::{Result, TaskdagError};
use crate::fs::{FileSystem, RealFileSystem};
use crate::record::RecordStore;
use crate::types::{ConnectOutcome, GraphEvent};

/// Applies user-requested dependency edges to disk and to the graph.
///
/// The child's record is rewritten first; in-memory state is only touched
/// once that write has succeeded, so a failed call leaves the graph exactly
/// as it was.
#[derive(Debug)]
pub struct GraphMutator<F: FileSystem = RealFileSystem> {
    store: RecordStore<F>,
    events: Option<UnboundedSender<GraphEvent>>,
}

impl<F: FileSystem> GraphMutator<F> {
    pub fn new(store: RecordStore<F>) -> Self {
        Self {
            store,
            events: None,
        }
    }

    /// Send a [`GraphEvent`] on `tx` after every edge that is added.
    pub fn with_events(mut self, tx: UnboundedSender<GraphEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    /// Create a fresh event channel, replacing any previous sender.
    pub fn subscribe(&mut self) -> UnboundedReceiver<GraphEvent> {
        let (tx, rx) = unbounded_channel();
        self.events = Some(tx);
        rx
    }

    pub fn store(&self) -> &RecordStore<F> {
        &self.store
    }

    /// Make `child_key` depend on `parent_key`.
    ///
    /// Returns [`ConnectOutcome::AlreadyConnected`] without touching anything
    /// when the child already depends on the parent. Cycles are accepted.
    /// Levels are not recomputed here.
    pub fn add_edge(
        &self,
        graph: &mut TaskGraph,
        parent_key: &str,
        child_key: &str,
    ) -> Result<ConnectOutcome> {
        if parent_key == child_key {
            return Err(TaskdagError::SelfDependency(parent_key.to_string()));
        }

        let parent = graph
            .get(parent_key)
            .ok_or_else(|| TaskdagError::NodeNotFound(parent_key.to_string()))?;
        let child = graph
            .get(child_key)
            .ok_or_else(|| TaskdagError::NodeNotFound(child_key.to_string()))?;

        if child.depends_on(parent_key) {
            info!(
                parent = %parent_key,
                child = %child_key,
                "'{}' already depends on '{}'",
                child.label,
                parent.label
            );
            return Ok(ConnectOutcome::AlreadyConnected);
        }

        let reference = parent.canonical_reference();
        let child_path = if child.file_path.as_os_str().is_empty() {
            self.store.path_for(child_key)
        } else {
            child.file_path.clone()
        };

        if let Some(other) = graph.get(&reference) {
            if other.key != parent_key {
                warn!(
                    reference = %reference,
                    parent = %parent_key,
                    resolves_to = %other.key,
                    "reference will resolve to a different task on reload"
                );
            }
        }
        if would_create_cycle(graph, parent_key, child_key) {
            warn!(
                parent = %parent_key,
                child = %child_key,
                "new dependency closes a cycle"
            );
        }

        self.persist_reference(child_key, child_path, &reference)?;

        if let Some(child) = graph.get_mut(child_key) {
            if !child.raw_deps.contains(&reference) {
                child.raw_deps.push(reference.clone());
            }
            if !child.depends_on(parent_key) {
                child.resolved_deps.push(parent_key.to_string());
            }
        }
        if let Some(parent) = graph.get_mut(parent_key) {
            if !parent.children.iter().any(|k| k == child_key) {
                parent.children.push(child_key.to_string());
            }
        }

        info!(parent = %parent_key, child = %child_key, reference = %reference, "connected tasks");
        self.emit(GraphEvent::EdgeAdded {
            parent: parent_key.to_string(),
            child: child_key.to_string(),
        });

        Ok(ConnectOutcome::Connected { reference })
    }

    /// Append `reference` to the child's `depends_on` on disk unless it is
    /// already listed there, in which case the file is left untouched.
    ///
    /// Only `depends_on` is edited; every other field is written back exactly
    /// as read. A `depends_on` that is not a list is replaced by a new one.
    fn persist_reference(&self, child_key: &str, path: PathBuf, reference: &str) -> Result<()> {
        let mut document = self.store.read_document(&path)?;

        let mut depends_on = match document.get("depends_on") {
            Some(Value::Array(items)) => items.clone(),
            Some(other) => {
                warn!(child = %child_key, value = %other, "depends_on is not a list; replacing it");
                Vec::new()
            }
            None => Vec::new(),
        };

        if depends_on.iter().any(|d| d.as_str() == Some(reference)) {
            debug!(child = %child_key, reference = %reference, "reference already on disk");
            return Ok(());
        }

        depends_on.push(Value::String(reference.to_string()));
        document.insert("depends_on".to_string(), Value::Array(depends_on));
        self.store.write_document(child_key, &path, &document)?;
        Ok(())
    }

    fn emit(&self, event: GraphEvent) {
        if let Some(tx) = &self.events {
            if tx.send(event).is_err() {
                debug!("graph event receiver dropped; event discarded");
            }
        }
    }
}

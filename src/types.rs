// src/types.rs

/// Canonical node identity: the record's file stem.
pub type NodeKey = String;

/// Signals emitted to collaborators (e.g. a renderer) when the graph changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphEvent {
    /// `child` now depends on `parent`; the edge is persisted on disk.
    EdgeAdded { parent: NodeKey, child: NodeKey },
}

/// Result of a successful `add_edge` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// The edge was added. `reference` is the string stored in the child's
    /// `depends_on`.
    Connected { reference: String },
    /// The child already depended on the parent; nothing changed.
    AlreadyConnected,
}

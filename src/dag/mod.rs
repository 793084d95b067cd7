// src/dag/mod.rs

//! Task graph construction and editing.
//!
//! - [`loader`] turns a directory of records into a [`TaskGraph`].
//! - [`resolver`] maps raw dependency strings onto node keys.
//! - [`layering`] assigns layout levels.
//! - [`mutator`] adds new edges, on disk and in memory.
//! - [`cycles`] reports cycles; nothing here rejects them.

pub mod cycles;
pub mod graph;
pub mod layering;
pub mod loader;
pub mod mutator;
pub mod node;
pub mod resolver;

pub use cycles::{find_cycles, would_create_cycle};
pub use graph::TaskGraph;
pub use layering::{LayeringReport, compute_levels};
pub use loader::{LoadReport, SkippedRecord, load_task_nodes};
pub use mutator::GraphMutator;
pub use node::TaskNode;
pub use resolver::{AmbiguousReference, ResolveReport, UnresolvedDependency, resolve_dependencies};

use crate::errors::StoreError;
use crate::fs::FileSystem;
use crate::record::RecordStore;

/// Everything recoverable that happened while building a graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub load: LoadReport,
    pub resolve: ResolveReport,
    pub layering: LayeringReport,
}

impl BuildReport {
    pub fn warning_count(&self) -> usize {
        self.load.skipped.len()
            + self.load.duplicate_keys.len()
            + self.resolve.unresolved.len()
            + self.resolve.ambiguous.len()
            + self.layering.cycle_affected.len()
    }
}

/// Load, resolve and layer: a graph ready for rendering.
pub fn build_dag<F: FileSystem>(
    store: &RecordStore<F>,
    detect_cycles: bool,
) -> Result<(TaskGraph, BuildReport), StoreError> {
    let (mut graph, load) = load_task_nodes(store)?;
    let resolve = resolve_dependencies(&mut graph);
    let layering = compute_levels(&mut graph, detect_cycles);
    Ok((
        graph,
        BuildReport {
            load,
            resolve,
            layering,
        },
    ))
}

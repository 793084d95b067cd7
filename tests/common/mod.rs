// tests/common/mod.rs
#![allow(dead_code)]

use std::error::Error;

use taskdag::dag::{BuildReport, TaskGraph, build_dag};
use taskdag::fs::FileSystem;
use taskdag::record::RecordStore;

pub use taskdag_test_utils::{RecordBuilder, TaskDirFixture, init_tracing};

pub type TestResult = Result<(), Box<dyn Error>>;

/// Load, resolve and layer with cycle detection on.
pub fn build<F: FileSystem>(
    store: &RecordStore<F>,
) -> Result<(TaskGraph, BuildReport), Box<dyn Error>> {
    Ok(build_dag(store, true)?)
}

/// Resolved dependencies of `key`, as owned strings.
pub fn deps(graph: &TaskGraph, key: &str) -> Vec<String> {
    graph.dependencies_of(key).to_vec()
}

pub fn children(graph: &TaskGraph, key: &str) -> Vec<String> {
    graph.dependents_of(key).to_vec()
}

pub fn level(graph: &TaskGraph, key: &str) -> usize {
    graph.get(key).map(|n| n.level).unwrap_or(usize::MAX)
}

/// `children` is exactly the transpose of `resolved_deps`.
pub fn assert_transposed(graph: &TaskGraph) {
    for node in graph.nodes() {
        for dep in &node.resolved_deps {
            let dep_node = graph.get(dep).expect("resolved dependency must exist");
            let hits = dep_node.children.iter().filter(|c| **c == node.key).count();
            assert_eq!(hits, 1, "{} should list {} exactly once as child", dep, node.key);
        }
        for child in &node.children {
            let child_node = graph.get(child).expect("child must exist");
            assert!(
                child_node.resolved_deps.contains(&node.key),
                "{} lists child {} which does not depend on it",
                node.key,
                child
            );
        }
    }
}

// src/dag/layering.rs

use std::collections::{HashMap, VecDeque};

use tracing::{debug, warn};

use crate::dag::graph::TaskGraph;
use crate::types::NodeKey;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayeringReport {
    /// Nodes whose in-degree never drained: members of a cycle and everything
    /// downstream of one. They are left at level 0. Empty unless cycle
    /// detection was requested.
    pub cycle_affected: Vec<NodeKey>,
}

impl LayeringReport {
    pub fn has_cycles(&self) -> bool {
        !self.cycle_affected.is_empty()
    }
}

/// Assign every node a layout level by longest path from the sources.
///
/// For every resolved edge `dep -> node` on an acyclic graph the result
/// satisfies `level(node) >= level(dep) + 1`. Nodes on or behind a cycle
/// keep level 0; with `detect_cycles` they are also listed in the report.
///
/// Expects `resolved_deps` and `children` to be in sync (i.e. the resolver
/// has run since the last edit).
pub fn compute_levels(graph: &mut TaskGraph, detect_cycles: bool) -> LayeringReport {
    let positions: HashMap<&str, usize> = graph
        .keys()
        .enumerate()
        .map(|(i, key)| (key, i))
        .collect();

    let mut in_degree: Vec<usize> = graph
        .nodes()
        .map(|node| {
            node.resolved_deps
                .iter()
                .filter(|dep| positions.contains_key(dep.as_str()))
                .count()
        })
        .collect();

    let children: Vec<Vec<usize>> = graph
        .nodes()
        .map(|node| {
            node.children
                .iter()
                .filter_map(|child| positions.get(child.as_str()).copied())
                .collect()
        })
        .collect();

    let mut levels = vec![0usize; in_degree.len()];
    let mut queue: VecDeque<usize> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, deg)| **deg == 0)
        .map(|(i, _)| i)
        .collect();

    while let Some(current) = queue.pop_front() {
        let next_level = levels[current] + 1;
        for &child in &children[current] {
            if in_degree[child] == 0 {
                continue;
            }
            in_degree[child] -= 1;
            levels[child] = levels[child].max(next_level);
            if in_degree[child] == 0 {
                queue.push_back(child);
            }
        }
    }

    let mut report = LayeringReport::default();
    for ((node, level), residual) in graph.nodes_mut().zip(levels).zip(&in_degree) {
        if *residual > 0 {
            node.level = 0;
            if detect_cycles {
                report.cycle_affected.push(node.key.clone());
            }
        } else {
            node.level = level;
        }
    }

    if report.has_cycles() {
        warn!(
            nodes = ?report.cycle_affected,
            "dependency cycle detected; affected tasks left at level 0"
        );
    }
    debug!(nodes = graph.len(), "computed levels");
    report
}

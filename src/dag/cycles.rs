// src/dag/cycles.rs

//! Cycle diagnostics on the resolved graph.
//!
//! Neither loading nor edge mutation rejects cycles; these helpers only
//! report them.

use std::collections::HashMap;

use petgraph::algo::{has_path_connecting, tarjan_scc};
use petgraph::graphmap::DiGraphMap;

use crate::dag::graph::TaskGraph;
use crate::types::NodeKey;

/// Edge direction: dependency -> dependent.
///
/// For a record `B` with `depends_on = ["A"]` the graph holds `A -> B`.
fn dependency_graph(graph: &TaskGraph) -> DiGraphMap<&str, ()> {
    let mut g: DiGraphMap<&str, ()> = DiGraphMap::new();
    for key in graph.keys() {
        g.add_node(key);
    }
    for (dep, child) in graph.edges() {
        g.add_edge(dep, child, ());
    }
    g
}

/// Every cycle as its set of member keys.
///
/// Members are listed in load order, and cycles are ordered by their first
/// member. A self-dependency is a cycle of one.
pub fn find_cycles(graph: &TaskGraph) -> Vec<Vec<NodeKey>> {
    let g = dependency_graph(graph);
    let positions: HashMap<&str, usize> = graph
        .keys()
        .enumerate()
        .map(|(i, key)| (key, i))
        .collect();
    let position = |key: &str| positions.get(key).copied().unwrap_or(usize::MAX);

    let mut cycles: Vec<Vec<&str>> = tarjan_scc(&g)
        .into_iter()
        .filter(|scc| match scc.as_slice() {
            [single] => g.contains_edge(*single, *single),
            members => members.len() > 1,
        })
        .collect();

    for members in &mut cycles {
        members.sort_by_key(|key| position(*key));
    }
    cycles.sort_by_key(|members| members.first().map(|key| position(*key)));

    cycles
        .into_iter()
        .map(|members| members.into_iter().map(str::to_string).collect())
        .collect()
}

/// Whether adding `parent -> child` would close a cycle, i.e. `parent`
/// already (transitively) depends on `child`.
pub fn would_create_cycle(graph: &TaskGraph, parent: &str, child: &str) -> bool {
    if parent == child {
        return true;
    }
    let g = dependency_graph(graph);
    g.contains_node(child)
        && g.contains_node(parent)
        && has_path_connecting(&g, child, parent, None)
}

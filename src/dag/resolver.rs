// src/dag/resolver.rs

//! Maps raw dependency strings to node keys.
//!
//! Each reference is tried against three tiers, first match wins:
//!
//! 1. a node key (`"EEEE1"` for `EEEE1.json`)
//! 2. a node's `group` + `id` (`"EEEE"` + `1`)
//! 3. a node's label; with several candidates the first in load order wins
//!
//! A reference matching nothing is dropped and reported. Resolution never
//! fails as a whole.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::dag::graph::TaskGraph;
use crate::types::NodeKey;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedDependency {
    /// Node whose `depends_on` holds the reference.
    pub node: NodeKey,
    pub reference: String,
}

/// A label reference that matched more than one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbiguousReference {
    pub node: NodeKey,
    pub reference: String,
    pub chosen: NodeKey,
    pub candidates: Vec<NodeKey>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveReport {
    /// One entry per unresolved occurrence.
    pub unresolved: Vec<UnresolvedDependency>,
    pub ambiguous: Vec<AmbiguousReference>,
}

impl ResolveReport {
    pub fn is_clean(&self) -> bool {
        self.unresolved.is_empty() && self.ambiguous.is_empty()
    }
}

/// Lookup tables for tiers 2 and 3, built in one pass over the graph.
struct ReferenceIndex<'g> {
    by_label: HashMap<&'g str, Vec<&'g str>>,
    by_group_id: HashMap<String, &'g str>,
}

impl<'g> ReferenceIndex<'g> {
    fn build(graph: &'g TaskGraph) -> Self {
        let mut by_label: HashMap<&str, Vec<&str>> = HashMap::new();
        let mut by_group_id: HashMap<String, &str> = HashMap::new();

        for node in graph.nodes() {
            by_label
                .entry(node.label.as_str())
                .or_default()
                .push(node.key.as_str());

            if let Some(gid) = node.group_id() {
                if let Some(previous) = by_group_id.insert(gid.clone(), node.key.as_str()) {
                    warn!(
                        reference = %gid,
                        previous = %previous,
                        current = %node.key,
                        "group+id shared by several tasks; the later one is used"
                    );
                }
            }
        }

        Self {
            by_label,
            by_group_id,
        }
    }
}

enum Match<'g> {
    Unique(&'g str),
    Ambiguous {
        chosen: &'g str,
        candidates: &'g [&'g str],
    },
    Missing,
}

fn match_reference<'g>(
    graph: &'g TaskGraph,
    index: &'g ReferenceIndex<'g>,
    reference: &str,
) -> Match<'g> {
    if let Some(node) = graph.get(reference) {
        return Match::Unique(node.key.as_str());
    }

    if let Some(key) = index.by_group_id.get(reference) {
        return Match::Unique(*key);
    }

    match index.by_label.get(reference).map(|v| v.as_slice()) {
        Some([only]) => Match::Unique(*only),
        Some(candidates @ [first, ..]) => Match::Ambiguous {
            chosen: *first,
            candidates,
        },
        _ => Match::Missing,
    }
}

/// Rebuild `resolved_deps` and `children` on every node from `raw_deps`.
///
/// Forward edges are resolved for the whole graph before any reverse edge is
/// written, so `children` is always the exact transpose of `resolved_deps`.
pub fn resolve_dependencies(graph: &mut TaskGraph) -> ResolveReport {
    let mut report = ResolveReport::default();

    let resolved: Vec<Vec<NodeKey>> = {
        let view: &TaskGraph = graph;
        let index = ReferenceIndex::build(view);
        view.nodes()
            .map(|node| {
                let mut deps: Vec<NodeKey> = Vec::with_capacity(node.raw_deps.len());
                for reference in &node.raw_deps {
                    let dep_key = match match_reference(view, &index, reference) {
                        Match::Unique(key) => key,
                        Match::Ambiguous { chosen, candidates } => {
                            warn!(
                                node = %node.key,
                                reference = %reference,
                                chosen = %chosen,
                                ?candidates,
                                "dependency label matches several tasks; using the first"
                            );
                            report.ambiguous.push(AmbiguousReference {
                                node: node.key.clone(),
                                reference: reference.clone(),
                                chosen: chosen.to_string(),
                                candidates: candidates.iter().map(|k| k.to_string()).collect(),
                            });
                            chosen
                        }
                        Match::Missing => {
                            warn!(
                                node = %node.key,
                                reference = %reference,
                                "dependency could not be resolved"
                            );
                            report.unresolved.push(UnresolvedDependency {
                                node: node.key.clone(),
                                reference: reference.clone(),
                            });
                            continue;
                        }
                    };

                    if deps.iter().any(|d| d == dep_key) {
                        debug!(node = %node.key, dep = %dep_key, "repeated dependency; keeping one edge");
                        continue;
                    }
                    deps.push(dep_key.to_string());
                }
                deps
            })
            .collect()
    };

    for (node, deps) in graph.nodes_mut().zip(resolved) {
        node.resolved_deps = deps;
        node.children.clear();
    }

    let edges: Vec<(NodeKey, NodeKey)> = graph
        .edges()
        .map(|(dep, child)| (dep.to_string(), child.to_string()))
        .collect();

    for (dep, child) in edges {
        if let Some(dep_node) = graph.get_mut(&dep) {
            dep_node.children.push(child);
        }
    }

    debug!(
        unresolved = report.unresolved.len(),
        ambiguous = report.ambiguous.len(),
        "resolved dependencies"
    );
    report
}

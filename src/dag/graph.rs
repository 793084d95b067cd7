// src/dag/graph.rs

use std::collections::{BTreeMap, HashMap};

use crate::dag::node::TaskNode;
use crate::types::NodeKey;

/// Arena of task nodes addressed by key.
///
/// Nodes live in a `Vec` in load order; edges are plain key lists on the
/// nodes, and every traversal goes through a key lookup. Iteration order is
/// the load order, which makes resolution and output deterministic.
#[derive(Debug, Clone, Default)]
pub struct TaskGraph {
    nodes: Vec<TaskNode>,
    index: HashMap<NodeKey, usize>,
}

impl TaskGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node. A node with the same key is replaced in place (keeping the
    /// original position) and returned.
    pub fn insert(&mut self, node: TaskNode) -> Option<TaskNode> {
        match self.index.get(&node.key) {
            Some(&idx) => Some(std::mem::replace(&mut self.nodes[idx], node)),
            None => {
                self.index.insert(node.key.clone(), self.nodes.len());
                self.nodes.push(node);
                None
            }
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&TaskNode> {
        self.index.get(key).map(|&idx| &self.nodes[idx])
    }

    pub(crate) fn get_mut(&mut self, key: &str) -> Option<&mut TaskNode> {
        match self.index.get(key) {
            Some(&idx) => Some(&mut self.nodes[idx]),
            None => None,
        }
    }

    /// Nodes in load order.
    pub fn nodes(&self) -> impl Iterator<Item = &TaskNode> {
        self.nodes.iter()
    }

    pub(crate) fn nodes_mut(&mut self) -> impl Iterator<Item = &mut TaskNode> {
        self.nodes.iter_mut()
    }

    /// All keys in load order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.key.as_str())
    }

    /// Resolved dependencies of a node (empty for unknown keys).
    pub fn dependencies_of(&self, key: &str) -> &[NodeKey] {
        self.get(key)
            .map(|n| n.resolved_deps.as_slice())
            .unwrap_or(&[])
    }

    /// Nodes depending on `key` (empty for unknown keys).
    pub fn dependents_of(&self, key: &str) -> &[NodeKey] {
        self.get(key)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Every resolved edge as `(dependency, dependent)`.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.nodes.iter().flat_map(|node| {
            node.resolved_deps
                .iter()
                .map(move |dep| (dep.as_str(), node.key.as_str()))
        })
    }

    /// Nodes without resolved dependencies.
    pub fn roots(&self) -> impl Iterator<Item = &TaskNode> {
        self.nodes.iter().filter(|n| n.resolved_deps.is_empty())
    }

    /// Nodes grouped by level, each group in load order.
    pub fn by_level(&self) -> BTreeMap<usize, Vec<&TaskNode>> {
        let mut layers: BTreeMap<usize, Vec<&TaskNode>> = BTreeMap::new();
        for node in &self.nodes {
            layers.entry(node.level).or_default().push(node);
        }
        layers
    }

    /// Distinct groups present, sorted.
    pub fn groups(&self) -> Vec<&str> {
        let mut groups: Vec<&str> = self
            .nodes
            .iter()
            .filter_map(|n| n.group.as_deref())
            .collect();
        groups.sort_unstable();
        groups.dedup();
        groups
    }
}

//! Plan - validated DAG of nodes and edges
//!
//! A `Plan` can only be obtained from [`PlanBuilder::build`], so every plan
//! value has already passed validation. Its topological order is computed
//! once during that validation and cached.
//!
//! [`PlanBuilder::build`]: super::builder::PlanBuilder::build

use std::collections::{HashMap, VecDeque};

use super::builder::PlanBuilder;
use super::node::{Edge, Node};

/// An immutable, validated graph of nodes
#[derive(Debug, Clone, Default)]
pub struct Plan {
    /// Nodes in insertion order
    nodes: Vec<Node>,
    index: HashMap<String, usize>,
    edges: Vec<Edge>,
    /// Sole upstream producer of each non-root node
    parents: HashMap<String, String>,
    /// Distinct downstream consumers of each node
    children: HashMap<String, Vec<String>>,
    order: Vec<String>,
}

impl Plan {
    /// Start building a plan
    pub fn builder() -> PlanBuilder {
        PlanBuilder::new()
    }

    pub(crate) fn from_validated(
        nodes: Vec<Node>,
        edges: Vec<Edge>,
        parents: HashMap<String, String>,
        children: HashMap<String, Vec<String>>,
        order: Vec<String>,
    ) -> Self {
        let index = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id().to_string(), i))
            .collect();

        Self {
            nodes,
            index,
            edges,
            parents,
            children,
            order,
        }
    }

    /// Get a node by id
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// All nodes, in the order they were added
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// All edges as declared, duplicates included
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes without an inbound edge
    pub fn roots(&self) -> impl Iterator<Item = &Node> {
        self.nodes
            .iter()
            .filter(move |n| !self.parents.contains_key(n.id()))
    }

    pub fn is_root(&self, id: &str) -> bool {
        self.contains(id) && !self.parents.contains_key(id)
    }

    /// Upstream producer of a node
    pub fn parent(&self, id: &str) -> Option<&str> {
        self.parents.get(id).map(String::as_str)
    }

    /// Nodes consuming the output of `id`
    pub fn dependents(&self, id: &str) -> &[String] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Node ids ordered so that producers precede consumers
    pub fn topological_order(&self) -> &[String] {
        &self.order
    }

    /// Get stats about the plan
    pub fn stats(&self) -> PlanStats {
        let mut depth: HashMap<&str, usize> = HashMap::new();
        for id in &self.order {
            let d = self
                .parents
                .get(id)
                .and_then(|p| depth.get(p.as_str()))
                .map_or(0, |d| d + 1);
            depth.insert(id.as_str(), d);
        }

        PlanStats {
            total_nodes: self.nodes.len(),
            total_edges: self.edges.len(),
            root_nodes: self.roots().count(),
            max_depth: depth.values().copied().max().unwrap_or(0),
        }
    }
}

/// Statistics about a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanStats {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub root_nodes: usize,
    /// Longest producer chain, counted in edges
    pub max_depth: usize,
}

/// Compute topological order using Kahn's algorithm
///
/// `children` must be free of duplicate entries. On failure returns the ids
/// that could not be ordered, i.e. the nodes on or behind a cycle.
pub(crate) fn topological_order(
    nodes: &[Node],
    children: &HashMap<String, Vec<String>>,
) -> Result<Vec<String>, Vec<String>> {
    let mut in_degree: HashMap<&str, usize> = nodes.iter().map(|n| (n.id(), 0)).collect();
    for targets in children.values() {
        for to in targets {
            if let Some(degree) = in_degree.get_mut(to.as_str()) {
                *degree += 1;
            }
        }
    }

    // Start with nodes that have no dependencies, in insertion order
    let mut queue: VecDeque<&str> = nodes
        .iter()
        .map(Node::id)
        .filter(|id| in_degree[id] == 0)
        .collect();

    let mut result = Vec::with_capacity(nodes.len());

    while let Some(id) = queue.pop_front() {
        result.push(id.to_string());

        if let Some(dependents) = children.get(id) {
            for dependent in dependents {
                if let Some(degree) = in_degree.get_mut(dependent.as_str()) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(dependent.as_str());
                    }
                }
            }
        }
    }

    // If not all nodes were processed, there's a cycle
    if result.len() != nodes.len() {
        let remaining = nodes
            .iter()
            .map(Node::id)
            .filter(|id| in_degree[id] > 0)
            .map(str::to_string)
            .collect();
        return Err(remaining);
    }

    Ok(result)
}

//! Builder for constructing plans
//!
//! Nodes and edges are accumulated as given; all validation happens once,
//! in [`PlanBuilder::build`], which reports the first violation found:
//!
//! 1. duplicate node id
//! 2. edge endpoint that is not a node of the plan
//! 3. dependency cycle
//! 4. node with more than one distinct upstream producer
//! 5. producer output type differing from the consumer input type

use std::collections::{HashMap, HashSet};

use super::graph::{topological_order, Plan};
use super::node::{Edge, Node};
use crate::agent::Agent;
use crate::error::{OrchestrationError, Result};

/// Accumulates nodes and edges for a [`Plan`]
#[derive(Debug, Default, Clone)]
pub struct PlanBuilder {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl PlanBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    /// Add a node built from an agent
    pub fn node<I, O>(self, id: impl Into<String>, agent: Agent<I, O>) -> Self
    where
        I: Clone + Send + Sync + 'static,
        O: Send + Sync + 'static,
    {
        self.add_node(Node::new(id, agent))
    }

    pub fn add_edge(mut self, edge: Edge) -> Self {
        self.edges.push(edge);
        self
    }

    /// Add an edge between two node ids, named `from->to`
    pub fn edge(self, from: &str, to: &str) -> Self {
        self.add_edge(Edge::between(format!("{}->{}", from, to), from, to))
    }

    /// Validate and freeze the plan
    pub fn build(self) -> Result<Plan> {
        let PlanBuilder { nodes, edges } = self;
        let (parents, children, order) = validate(&nodes, &edges)?;

        tracing::debug!(nodes = nodes.len(), edges = edges.len(), "plan validated");
        Ok(Plan::from_validated(nodes, edges, parents, children, order))
    }
}

type Links = (HashMap<String, String>, HashMap<String, Vec<String>>, Vec<String>);

/// Check the plan invariants; returns parents, children and topological order
fn validate(nodes: &[Node], edges: &[Edge]) -> Result<Links> {
    let mut by_id: HashMap<&str, &Node> = HashMap::with_capacity(nodes.len());
    for node in nodes {
        if by_id.insert(node.id(), node).is_some() {
            return Err(OrchestrationError::plan_validation(format!(
                "duplicate node id '{}'",
                node.id()
            )));
        }
    }

    for edge in edges {
        for endpoint in [edge.from(), edge.to()] {
            if !by_id.contains_key(endpoint) {
                return Err(OrchestrationError::plan_validation(format!(
                    "edge '{}' references unknown node '{}'",
                    edge.id(),
                    endpoint
                )));
            }
        }
    }

    // Parallel duplicate edges collapse into one dependency.
    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    let mut children: HashMap<String, Vec<String>> = HashMap::new();
    let mut parents: HashMap<String, String> = HashMap::new();
    let mut conflicts = Vec::new();
    for edge in edges {
        if !seen.insert((edge.from(), edge.to())) {
            continue;
        }
        children
            .entry(edge.from().to_string())
            .or_default()
            .push(edge.to().to_string());
        if let Some(existing) = parents.insert(edge.to().to_string(), edge.from().to_string()) {
            conflicts.push((edge.to(), existing, edge.from()));
        }
    }

    let order = topological_order(nodes, &children).map_err(|cycle| {
        OrchestrationError::plan_validation(format!(
            "dependency cycle among nodes [{}]",
            cycle.join(", ")
        ))
    })?;

    if let Some((node, first, second)) = conflicts.first() {
        return Err(OrchestrationError::plan_validation(format!(
            "node '{}' has more than one upstream producer ('{}' and '{}')",
            node, first, second
        )));
    }

    for edge in edges {
        let producer = by_id[edge.from()];
        let consumer = by_id[edge.to()];
        if producer.output_type() != consumer.input_type() {
            return Err(OrchestrationError::plan_validation(format!(
                "edge '{}' connects output {} of '{}' to input {} of '{}'",
                edge.id(),
                producer.output_type(),
                producer.id(),
                consumer.input_type(),
                consumer.id()
            )));
        }
    }

    Ok((parents, children, order))
}

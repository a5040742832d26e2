//! Undirected weighted graph built from an edge table.
//!
//! Uses `petgraph` for the graph structure and a side map from [`NodeId`] to
//! `NodeIndex` for O(1) node lookups.

use std::collections::HashMap;

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

use crate::error::SchemaResult;
use crate::node::NodeId;
use crate::table::{Column, EdgeTable};

const OPERATION: &str = "build_graph";

/// Simple undirected graph with `f64` edge weights.
///
/// At most one edge joins any two nodes; setting an edge that already exists
/// (in either orientation) overwrites its weight. Self-loops are allowed.
#[derive(Clone, Default)]
pub struct WeightedGraph {
    graph: UnGraph<NodeId, f64>,
    node_index: HashMap<NodeId, NodeIndex>,
}

impl WeightedGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_node(&mut self, node: NodeId) -> NodeIndex {
        if let Some(&idx) = self.node_index.get(&node) {
            return idx;
        }
        let idx = self.graph.add_node(node);
        self.node_index.insert(node, idx);
        idx
    }

    /// Add the edge `{u, v}` or overwrite its weight if it already exists.
    pub fn set_edge(&mut self, u: NodeId, v: NodeId, weight: f64) {
        let a = self.ensure_node(u);
        let b = self.ensure_node(v);
        self.graph.update_edge(a, b, weight);
    }

    /// Weight of the edge `{u, v}`, if present.
    pub fn edge_weight(&self, u: NodeId, v: NodeId) -> Option<f64> {
        let a = *self.node_index.get(&u)?;
        let b = *self.node_index.get(&v)?;
        let edge = self.graph.find_edge(a, b)?;
        self.graph.edge_weight(edge).copied()
    }

    /// Whether `{u, v}` is an edge.
    pub fn has_edge(&self, u: NodeId, v: NodeId) -> bool {
        self.edge_weight(u, v).is_some()
    }

    /// Check if a node exists.
    pub fn has_node(&self, node: NodeId) -> bool {
        self.node_index.contains_key(&node)
    }

    /// Neighbors of `node`, sorted. Empty if the node is unknown.
    ///
    /// A node with a self-loop lists itself once.
    pub fn neighbors(&self, node: NodeId) -> Vec<NodeId> {
        let Some(&idx) = self.node_index.get(&node) else {
            return vec![];
        };
        let mut neighbors: Vec<NodeId> = self
            .graph
            .neighbors(idx)
            .filter_map(|n| self.graph.node_weight(n).copied())
            .collect();
        neighbors.sort_unstable();
        neighbors.dedup();
        neighbors
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All node ids, sorted.
    pub fn nodes(&self) -> Vec<NodeId> {
        let mut nodes: Vec<NodeId> = self.node_index.keys().copied().collect();
        nodes.sort_unstable();
        nodes
    }

    /// All edges as `(a, b, weight)` with `a <= b`, sorted by endpoints.
    pub fn edges(&self) -> Vec<(NodeId, NodeId, f64)> {
        let mut edges: Vec<(NodeId, NodeId, f64)> = self
            .graph
            .edge_references()
            .map(|e| {
                let a = self.graph[e.source()];
                let b = self.graph[e.target()];
                (a.min(b), a.max(b), *e.weight())
            })
            .collect();
        edges.sort_by(|x, y| (x.0, x.1).cmp(&(y.0, y.1)));
        edges
    }
}

impl PartialEq for WeightedGraph {
    fn eq(&self, other: &Self) -> bool {
        self.node_count() == other.node_count()
            && self.edge_count() == other.edge_count()
            && self.nodes() == other.nodes()
            && self.edges() == other.edges()
    }
}

impl std::fmt::Debug for WeightedGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeightedGraph")
            .field("nodes", &self.node_count())
            .field("edges", &self.edge_count())
            .finish()
    }
}

/// Build an undirected weighted graph from `table` (columns `u`, `v`, `h`).
///
/// Rows are applied in order, so the last row naming a node pair decides that
/// edge's weight. Only nodes that occur in some row end up in the graph.
pub fn build_graph(table: &EdgeTable) -> SchemaResult<WeightedGraph> {
    let u = table.sources().ok_or_else(|| Column::U.missing_for(OPERATION))?;
    let v = table.targets().ok_or_else(|| Column::V.missing_for(OPERATION))?;
    let h = table.weights().ok_or_else(|| Column::H.missing_for(OPERATION))?;

    let mut graph = WeightedGraph::new();
    for ((&src, &dst), &weight) in u.iter().zip(v).zip(h) {
        graph.set_edge(src, dst, weight);
    }

    tracing::debug!(
        rows = table.len(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "built weighted graph"
    );
    Ok(graph)
}

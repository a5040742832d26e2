//! Node-to-neighbor-set mappings.
//!
//! An [`Adjacency`] is the shape both sides of [`recall_at_k`](crate::metrics::recall_at_k)
//! take: ground truth built from held-out edges, and predictions produced by
//! whatever link predictor is under evaluation.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EvalError, EvalResult, SchemaError, SchemaResult};
use crate::node::NodeId;
use crate::table::{Column, EdgeTable};

const OPERATION: &str = "build_adjacency";

/// Mapping from a node to the set of its neighbors.
///
/// Keys and sets are ordered so that serialized output is deterministic.
/// JSON form: `{"1": [10, 20], "2": [30]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Adjacency(BTreeMap<NodeId, BTreeSet<NodeId>>);

impl Adjacency {
    /// Create a new empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `v` as a neighbor of `u`.
    pub fn insert(&mut self, u: NodeId, v: NodeId) {
        self.0.entry(u).or_default().insert(v);
    }

    /// Neighbor set of `node`, if it is a key.
    pub fn get(&self, node: NodeId) -> Option<&BTreeSet<NodeId>> {
        self.0.get(&node)
    }

    /// Whether `node` is a key.
    pub fn contains(&self, node: NodeId) -> bool {
        self.0.contains_key(&node)
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keys in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.0.keys().copied()
    }

    /// `(node, neighbors)` entries in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &BTreeSet<NodeId>)> + '_ {
        self.0.iter().map(|(k, v)| (*k, v))
    }

    /// Total number of `(node, neighbor)` pairs.
    pub fn pair_count(&self) -> usize {
        self.0.values().map(BTreeSet::len).sum()
    }

    /// Parse a mapping from JSON.
    pub fn from_json_str(input: &str) -> SchemaResult<Self> {
        serde_json::from_str(input).map_err(|e| SchemaError::Malformed {
            message: format!("adjacency mapping: {e}"),
        })
    }

    /// Read and parse a JSON mapping from disk.
    pub fn load_json(path: &Path) -> EvalResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| EvalError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let adjacency = Self::from_json_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            keys = adjacency.len(),
            pairs = adjacency.pair_count(),
            "loaded adjacency mapping"
        );
        Ok(adjacency)
    }
}

impl FromIterator<(NodeId, NodeId)> for Adjacency {
    fn from_iter<I: IntoIterator<Item = (NodeId, NodeId)>>(iter: I) -> Self {
        let mut adjacency = Self::new();
        for (u, v) in iter {
            adjacency.insert(u, v);
        }
        adjacency
    }
}

impl FromIterator<(NodeId, BTreeSet<NodeId>)> for Adjacency {
    fn from_iter<I: IntoIterator<Item = (NodeId, BTreeSet<NodeId>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Build the mapping `u -> {v}` from `table` (columns `u`, `v`).
///
/// Keys are exactly the distinct `u` values; nodes that only ever appear as
/// `v` are not keys. Row order does not matter.
pub fn build_adjacency(table: &EdgeTable) -> SchemaResult<Adjacency> {
    let u = table.sources().ok_or_else(|| Column::U.missing_for(OPERATION))?;
    let v = table.targets().ok_or_else(|| Column::V.missing_for(OPERATION))?;

    let adjacency: Adjacency = u.iter().copied().zip(v.iter().copied()).collect();

    tracing::debug!(
        rows = table.len(),
        keys = adjacency.len(),
        pairs = adjacency.pair_count(),
        "built adjacency mapping"
    );
    Ok(adjacency)
}

//! Held-out test edge selection.
//!
//! For every source node with enough outgoing edges, pick a fixed number of
//! its edges by timestamp. The selected pairs are the ground truth a link
//! predictor is evaluated against; [`EdgeTable::without_pairs`] removes them
//! from the training data.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::SchemaResult;
use crate::node::NodeId;
use crate::table::{Column, EdgeTable};

const OPERATION: &str = "select_test_edges";

/// Which end of each node's timeline to take test edges from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeOrder {
    /// Smallest `t` first.
    #[default]
    Earliest,
    /// Largest `t` first.
    Latest,
}

impl std::fmt::Display for EdgeOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EdgeOrder::Earliest => write!(f, "earliest"),
            EdgeOrder::Latest => write!(f, "latest"),
        }
    }
}

/// Parameters for [`select_test_edges`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// A node qualifies only with strictly more outgoing edges than this.
    pub edges_threshold: usize,
    /// Edges taken from each qualifying node.
    pub n_smallest: usize,
    /// Timeline end the edges are taken from.
    pub order: EdgeOrder,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            edges_threshold: 6,
            n_smallest: 5,
            order: EdgeOrder::Earliest,
        }
    }
}

/// One held-out `(u, v)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TestEdge {
    pub u: NodeId,
    pub v: NodeId,
}

impl From<TestEdge> for (NodeId, NodeId) {
    fn from(edge: TestEdge) -> Self {
        (edge.u, edge.v)
    }
}

/// Select test edges from `table` (columns `u`, `v`, `t`).
///
/// Nodes with more than `edges_threshold` rows as `u` qualify. For each, its
/// rows are ordered by `t` (ties keep input order) and the first
/// `n_smallest` targets are emitted as separate `(u, v)` pairs. Nodes come out
/// in order of first appearance; a node with fewer than `n_smallest` edges
/// contributes all of them and nothing else.
pub fn select_test_edges(table: &EdgeTable, config: &SelectionConfig) -> SchemaResult<Vec<TestEdge>> {
    let u = table.sources().ok_or_else(|| Column::U.missing_for(OPERATION))?;
    let v = table.targets().ok_or_else(|| Column::V.missing_for(OPERATION))?;
    let t = table.timestamps().ok_or_else(|| Column::T.missing_for(OPERATION))?;

    let mut counts: HashMap<NodeId, usize> = HashMap::new();
    for node in u {
        *counts.entry(*node).or_default() += 1;
    }

    // Row indices per qualifying node, nodes in first-appearance order.
    let mut group_of: HashMap<NodeId, usize> = HashMap::new();
    let mut groups: Vec<(NodeId, Vec<usize>)> = Vec::new();
    for (row, node) in u.iter().enumerate() {
        if counts[node] <= config.edges_threshold {
            continue;
        }
        let slot = *group_of.entry(*node).or_insert_with(|| {
            groups.push((*node, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(row);
    }

    let qualifying = groups.len();
    let capacity = qualifying.saturating_mul(config.n_smallest).min(u.len());
    let mut selected = Vec::with_capacity(capacity);
    for (node, mut rows) in groups {
        match config.order {
            EdgeOrder::Earliest => rows.sort_by_key(|&row| t[row]),
            EdgeOrder::Latest => rows.sort_by(|&a, &b| t[b].cmp(&t[a])),
        }
        selected.extend(
            rows.into_iter()
                .take(config.n_smallest)
                .map(|row| TestEdge { u: node, v: v[row] }),
        );
    }

    tracing::debug!(
        rows = table.len(),
        qualifying,
        selected = selected.len(),
        threshold = config.edges_threshold,
        order = %config.order,
        "selected test edges"
    );
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchemaError;
    use crate::table::EdgeRecord;

    fn n(id: u64) -> NodeId {
        NodeId::new(id)
    }

    fn edge(u: u64, v: u64) -> TestEdge {
        TestEdge { u: n(u), v: n(v) }
    }

    /// Node 1 has 8 edges with shuffled timestamps, node 2 has exactly 6,
    /// node 3 has 7.
    fn sample_table() -> EdgeTable {
        let mut records = Vec::new();
        for (v, t) in [(10, 50), (11, 20), (12, 80), (13, 10), (14, 70), (15, 30), (16, 60), (17, 40)] {
            records.push(EdgeRecord::new(1, v, t, 1.0));
        }
        for v in 20..26 {
            records.push(EdgeRecord::new(2, v, v as i64, 1.0));
        }
        for (v, t) in [(30, 3), (31, 1), (32, 2), (33, 7), (34, 6), (35, 5), (36, 4)] {
            records.push(EdgeRecord::new(3, v, t, 1.0));
        }
        EdgeTable::from_records(&records)
    }

    #[test]
    fn picks_earliest_edges_of_qualifying_nodes() {
        let selected = select_test_edges(&sample_table(), &SelectionConfig::default()).unwrap();
        assert_eq!(
            selected,
            vec![
                edge(1, 13),
                edge(1, 11),
                edge(1, 15),
                edge(1, 17),
                edge(1, 10),
                edge(3, 31),
                edge(3, 32),
                edge(3, 30),
                edge(3, 36),
                edge(3, 35),
            ]
        );
    }

    #[test]
    fn nodes_at_threshold_are_excluded() {
        let selected = select_test_edges(&sample_table(), &SelectionConfig::default()).unwrap();
        assert!(selected.iter().all(|e| e.u != n(2)));
    }

    #[test]
    fn latest_order_takes_largest_timestamps() {
        let config = SelectionConfig {
            n_smallest: 2,
            order: EdgeOrder::Latest,
            ..Default::default()
        };
        let selected = select_test_edges(&sample_table(), &config).unwrap();
        assert_eq!(selected, vec![edge(1, 12), edge(1, 14), edge(3, 33), edge(3, 34)]);
    }

    #[test]
    fn short_groups_yield_only_real_edges() {
        let config = SelectionConfig {
            edges_threshold: 0,
            n_smallest: 3,
            ..Default::default()
        };
        let table = EdgeTable::from_records(&[
            EdgeRecord::new(9, 1, 5, 0.0),
            EdgeRecord::new(4, 2, 1, 0.0),
            EdgeRecord::new(9, 3, 2, 0.0),
        ]);
        let selected = select_test_edges(&table, &config).unwrap();
        assert_eq!(selected, vec![edge(9, 3), edge(9, 1), edge(4, 2)]);
    }

    #[test]
    fn ties_keep_input_order() {
        let config = SelectionConfig {
            edges_threshold: 0,
            n_smallest: 2,
            ..Default::default()
        };
        let table = EdgeTable::from_records(&[
            EdgeRecord::new(1, 7, 3, 0.0),
            EdgeRecord::new(1, 8, 3, 0.0),
            EdgeRecord::new(1, 9, 3, 0.0),
        ]);
        let selected = select_test_edges(&table, &config).unwrap();
        assert_eq!(selected, vec![edge(1, 7), edge(1, 8)]);
    }

    #[test]
    fn unbounded_n_smallest_takes_every_edge() {
        let config = SelectionConfig {
            n_smallest: usize::MAX,
            ..Default::default()
        };
        let selected = select_test_edges(&sample_table(), &config).unwrap();
        assert_eq!(selected.len(), 15);
        assert_eq!(selected.iter().filter(|e| e.u == n(1)).count(), 8);
        assert_eq!(selected.iter().filter(|e| e.u == n(3)).count(), 7);
        assert_eq!(selected[0], edge(1, 13));
        assert_eq!(selected[14], edge(3, 33));

        let config = SelectionConfig {
            n_smallest: 1 << 40,
            ..Default::default()
        };
        assert_eq!(select_test_edges(&sample_table(), &config).unwrap().len(), 15);
    }

    #[test]
    fn no_qualifying_node_gives_empty_result() {
        let config = SelectionConfig {
            edges_threshold: 100,
            ..Default::default()
        };
        assert!(select_test_edges(&sample_table(), &config).unwrap().is_empty());
    }

    #[test]
    fn missing_timestamp_column_is_a_schema_error() {
        let table = EdgeTable::from_pairs([(n(1), n(2))]);
        let err = select_test_edges(&table, &SelectionConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::MissingColumn {
                column: "t",
                operation: "select_test_edges"
            }
        ));
    }
}

// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # linkeval
//!
//! Helpers for evaluating link prediction on graph data.
//!
//! ## Pipeline
//!
//! - **Edge tables** (`table`): column-oriented `(u, v, t, h)` rows loaded from JSON
//! - **Test edge selection** (`select`): hold out the earliest (or latest) edges of busy nodes
//! - **Weighted graphs** (`graph`): undirected `petgraph` graphs with last-write-wins weights
//! - **Adjacency mappings** (`adjacency`): node to neighbor-set lookups
//! - **Recall@k** (`metrics`): micro-averaged recall of predicted neighbor sets
//!
//! ## Library usage
//!
//! ```
//! use linkeval::{build_adjacency, recall_at_k, select_test_edges};
//! use linkeval::{DEFAULT_K, EdgeRecord, EdgeTable, SelectionConfig};
//!
//! let records: Vec<EdgeRecord> = (0..8).map(|i| EdgeRecord::new(1, 10 + i, i as i64, 1.0)).collect();
//! let table = EdgeTable::from_records(&records);
//!
//! let test_edges = select_test_edges(&table, &SelectionConfig::default()).unwrap();
//! let truth = build_adjacency(&EdgeTable::from_pairs(test_edges.iter().map(|e| (e.u, e.v)))).unwrap();
//! let recall = recall_at_k(&truth, &truth, DEFAULT_K).unwrap();
//! assert_eq!(recall, 1.0);
//! ```

pub mod adjacency;
pub mod config;
pub mod error;
pub mod graph;
pub mod metrics;
pub mod node;
pub mod select;
pub mod table;

pub use adjacency::{Adjacency, build_adjacency};
pub use config::{EvalConfig, RecallConfig};
pub use error::{EvalError, EvalResult, MetricError, SchemaError};
pub use graph::{WeightedGraph, build_graph};
pub use metrics::{DEFAULT_K, RecallReport, recall_at_k, recall_report};
pub use node::NodeId;
pub use select::{EdgeOrder, SelectionConfig, TestEdge, select_test_edges};
pub use table::{Column, EdgeRecord, EdgeTable};

//! Recall@k over adjacency mappings.
//!
//! Recall is micro-averaged: hits and capped ground-truth sizes are summed
//! over all predicted nodes before dividing, so nodes with many true
//! neighbors weigh more than in a per-node mean.

use serde::{Deserialize, Serialize};

use crate::adjacency::Adjacency;
use crate::error::{MetricError, MetricResult};
use crate::node::NodeId;

/// Cap on each node's ground-truth count when none is configured.
pub const DEFAULT_K: usize = 10;

/// Contribution of a single predicted node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecall {
    pub node: NodeId,
    /// Predicted neighbors that are true neighbors.
    pub hits: usize,
    /// `min(|actual|, k)`.
    pub denominator: usize,
}

/// Per-node breakdown and totals of a recall@k computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecallReport {
    pub k: usize,
    pub per_node: Vec<NodeRecall>,
    pub total_hits: usize,
    pub total_actual: usize,
}

impl RecallReport {
    /// `total_hits / total_actual`.
    ///
    /// A report is only built when `total_actual > 0`.
    pub fn recall(&self) -> f64 {
        self.total_hits as f64 / self.total_actual as f64
    }
}

/// Compute recall@k of `predicted` against `actual`, keeping the per-node
/// breakdown.
///
/// Every key of `predicted` must be a key of `actual`. Predicted sets are
/// taken as given; callers pass their top-k predictions.
pub fn recall_report(predicted: &Adjacency, actual: &Adjacency, k: usize) -> MetricResult<RecallReport> {
    let mut per_node = Vec::with_capacity(predicted.len());
    let mut total_hits = 0;
    let mut total_actual = 0;

    for (node, guesses) in predicted.iter() {
        let truth = actual
            .get(node)
            .ok_or(MetricError::MissingKey { node: node.get() })?;
        if guesses.len() > k {
            tracing::warn!(
                %node,
                predicted = guesses.len(),
                k,
                "prediction set larger than k; recall may exceed 1"
            );
        }
        let hits = guesses.intersection(truth).count();
        let denominator = truth.len().min(k);
        total_hits += hits;
        total_actual += denominator;
        per_node.push(NodeRecall {
            node,
            hits,
            denominator,
        });
    }

    if total_actual == 0 {
        return Err(MetricError::DegenerateInput {
            predicted_keys: predicted.len(),
            k,
        });
    }

    tracing::debug!(
        nodes = per_node.len(),
        total_hits,
        total_actual,
        k,
        "computed recall"
    );
    Ok(RecallReport {
        k,
        per_node,
        total_hits,
        total_actual,
    })
}

/// Micro-averaged recall@k of `predicted` against `actual`.
///
/// For each predicted node, hits are `|predicted ∩ actual|` and the
/// denominator is `min(|actual|, k)`; the result is the ratio of the sums.
/// Fails with [`MetricError::MissingKey`] when a predicted node has no entry
/// in `actual` and with [`MetricError::DegenerateInput`] when the summed
/// denominator is zero.
pub fn recall_at_k(predicted: &Adjacency, actual: &Adjacency, k: usize) -> MetricResult<f64> {
    recall_report(predicted, actual, k).map(|report| report.recall())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn adj(entries: &[(u64, &[u64])]) -> Adjacency {
        entries
            .iter()
            .map(|(k, vs)| {
                let set: BTreeSet<NodeId> = vs.iter().copied().map(NodeId::new).collect();
                (NodeId::new(*k), set)
            })
            .collect()
    }

    #[test]
    fn single_node_recall() {
        let predicted = adj(&[(1, &[10, 20])]);
        let actual = adj(&[(1, &[10, 30, 40])]);
        let recall = recall_at_k(&predicted, &actual, DEFAULT_K).unwrap();
        assert!((recall - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn micro_average_over_nodes() {
        let predicted = adj(&[(1, &[10, 20]), (2, &[99])]);
        let actual = adj(&[(1, &[10, 20, 30]), (2, &[100])]);
        let recall = recall_at_k(&predicted, &actual, DEFAULT_K).unwrap();
        assert!((recall - 0.5).abs() < 1e-12);
    }

    #[test]
    fn denominator_is_capped_at_k() {
        let truth: Vec<u64> = (100..115).collect();
        let predicted = adj(&[(1, &[100, 101, 102])]);
        let actual = adj(&[(1, truth.as_slice())]);
        let report = recall_report(&predicted, &actual, 10).unwrap();
        assert_eq!(report.total_actual, 10);
        assert_eq!(report.total_hits, 3);
        assert!((report.recall() - 0.3).abs() < 1e-12);

        let report = recall_report(&predicted, &actual, 5).unwrap();
        assert_eq!(report.total_actual, 5);
    }

    #[test]
    fn extra_actual_keys_are_ignored() {
        let predicted = adj(&[(1, &[10])]);
        let actual = adj(&[(1, &[10]), (2, &[20, 30])]);
        assert_eq!(recall_at_k(&predicted, &actual, DEFAULT_K).unwrap(), 1.0);
    }

    #[test]
    fn report_lists_every_predicted_node() {
        let predicted = adj(&[(2, &[5]), (1, &[10, 20])]);
        let actual = adj(&[(1, &[10, 20, 30]), (2, &[6])]);
        let report = recall_report(&predicted, &actual, DEFAULT_K).unwrap();
        assert_eq!(
            report.per_node,
            vec![
                NodeRecall {
                    node: NodeId::new(1),
                    hits: 2,
                    denominator: 3
                },
                NodeRecall {
                    node: NodeId::new(2),
                    hits: 0,
                    denominator: 1
                },
            ]
        );
    }

    #[test]
    fn missing_actual_key_is_a_lookup_error() {
        let predicted = adj(&[(1, &[10]), (3, &[1]), (7, &[1])]);
        let actual = adj(&[(1, &[10])]);
        let err = recall_at_k(&predicted, &actual, DEFAULT_K).unwrap_err();
        assert!(matches!(err, MetricError::MissingKey { node: 3 }));
    }

    #[test]
    fn empty_prediction_is_degenerate() {
        let err = recall_at_k(&Adjacency::new(), &adj(&[(1, &[2])]), DEFAULT_K).unwrap_err();
        assert!(matches!(
            err,
            MetricError::DegenerateInput {
                predicted_keys: 0,
                k: 10
            }
        ));
    }

    #[test]
    fn zero_k_is_degenerate() {
        let predicted = adj(&[(1, &[10])]);
        let actual = adj(&[(1, &[10])]);
        assert!(matches!(
            recall_at_k(&predicted, &actual, 0).unwrap_err(),
            MetricError::DegenerateInput { k: 0, .. }
        ));
    }

    #[test]
    fn empty_truth_sets_are_degenerate() {
        let predicted = adj(&[(1, &[10])]);
        let actual = adj(&[(1, &[])]);
        assert!(matches!(
            recall_at_k(&predicted, &actual, DEFAULT_K).unwrap_err(),
            MetricError::DegenerateInput { .. }
        ));
    }
}

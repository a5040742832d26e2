//! Column-oriented edge tables.
//!
//! An [`EdgeTable`] is the tabular input of every operation: rows of
//! `(u, v, t, h)` stored column-wise, where each column is either present for
//! every row or absent altogether. Operations check for the columns they read
//! and report a [`SchemaError::MissingColumn`] otherwise; nothing else about
//! the schema is enforced.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{EvalError, EvalResult, SchemaError, SchemaResult};
use crate::node::NodeId;

/// A named column of an edge table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Column {
    /// Source node.
    U,
    /// Target node.
    V,
    /// Timestamp-like ordering key.
    T,
    /// Auxiliary weight.
    H,
}

impl Column {
    /// All columns, in canonical order.
    pub const ALL: [Column; 4] = [Column::U, Column::V, Column::T, Column::H];

    /// The column name as it appears in JSON input.
    pub fn name(self) -> &'static str {
        match self {
            Column::U => "u",
            Column::V => "v",
            Column::T => "t",
            Column::H => "h",
        }
    }

    /// The error reported when `operation` needs this column and it is absent.
    pub fn missing_for(self, operation: &'static str) -> SchemaError {
        SchemaError::MissingColumn {
            column: self.name(),
            operation,
        }
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A single edge row with every column filled in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    /// Source node.
    pub u: NodeId,
    /// Target node.
    pub v: NodeId,
    /// Timestamp-like ordering key.
    pub t: i64,
    /// Auxiliary weight.
    pub h: f64,
}

impl EdgeRecord {
    pub fn new(u: u64, v: u64, t: i64, h: f64) -> Self {
        Self {
            u: NodeId::new(u),
            v: NodeId::new(v),
            t,
            h,
        }
    }
}

/// Ordered edge rows stored column-wise.
///
/// Duplicated rows are allowed and row order is preserved by every
/// transformation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeTable {
    len: usize,
    u: Option<Vec<NodeId>>,
    v: Option<Vec<NodeId>>,
    t: Option<Vec<i64>>,
    h: Option<Vec<f64>>,
}

impl EdgeTable {
    /// Build a table carrying all four columns.
    pub fn from_records(records: &[EdgeRecord]) -> Self {
        Self {
            len: records.len(),
            u: Some(records.iter().map(|r| r.u).collect()),
            v: Some(records.iter().map(|r| r.v).collect()),
            t: Some(records.iter().map(|r| r.t).collect()),
            h: Some(records.iter().map(|r| r.h).collect()),
        }
    }

    /// Build a table with only the `u` and `v` columns.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (NodeId, NodeId)>) -> Self {
        let (u, v): (Vec<NodeId>, Vec<NodeId>) = pairs.into_iter().unzip();
        Self {
            len: u.len(),
            u: Some(u),
            v: Some(v),
            t: None,
            h: None,
        }
    }

    /// Build a table with the `u`, `v` and `h` columns.
    pub fn from_weighted(edges: impl IntoIterator<Item = (NodeId, NodeId, f64)>) -> Self {
        let mut u = Vec::new();
        let mut v = Vec::new();
        let mut h = Vec::new();
        for (src, dst, weight) in edges {
            u.push(src);
            v.push(dst);
            h.push(weight);
        }
        Self {
            len: u.len(),
            u: Some(u),
            v: Some(v),
            t: None,
            h: Some(h),
        }
    }

    /// Parse a table from JSON.
    ///
    /// Two shapes are accepted: an array of row objects
    /// (`[{"u": 1, "v": 2, "t": 5}, ...]`) or an object of equal-length column
    /// arrays (`{"u": [1], "v": [2], "t": [5]}`). Keys other than the four
    /// column names are ignored.
    pub fn from_json_str(input: &str) -> SchemaResult<Self> {
        let value: Value = serde_json::from_str(input).map_err(|e| SchemaError::Malformed {
            message: e.to_string(),
        })?;
        match value {
            Value::Array(rows) => Self::from_json_rows(&rows),
            Value::Object(columns) => Self::from_json_columns(&columns),
            other => Err(SchemaError::Malformed {
                message: format!("expected an array of rows or an object of columns, found {other}"),
            }),
        }
    }

    /// Read and parse a JSON table from disk.
    pub fn load_json(path: &Path) -> EvalResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| EvalError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let table = Self::from_json_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            rows = table.len(),
            columns = ?table.columns(),
            "loaded edge table"
        );
        Ok(table)
    }

    fn from_json_rows(rows: &[Value]) -> SchemaResult<Self> {
        let objects: Vec<&Map<String, Value>> = rows
            .iter()
            .enumerate()
            .map(|(row, value)| {
                value.as_object().ok_or_else(|| SchemaError::Malformed {
                    message: format!("row {row} is not an object"),
                })
            })
            .collect::<SchemaResult<_>>()?;

        let mut table = Self {
            len: objects.len(),
            ..Default::default()
        };
        for column in Column::ALL {
            let name = column.name();
            if !objects.iter().any(|o| o.contains_key(name)) {
                continue;
            }
            if let Some(row) = objects.iter().position(|o| !o.contains_key(name)) {
                return Err(SchemaError::RaggedColumn {
                    column: name,
                    expected: objects.len(),
                    row,
                });
            }
            table.set_column(column, objects.iter().map(|o| &o[name]))?;
        }
        Ok(table)
    }

    fn from_json_columns(columns: &Map<String, Value>) -> SchemaResult<Self> {
        let mut table = Self::default();
        let mut expected: Option<usize> = None;
        for column in Column::ALL {
            let Some(value) = columns.get(column.name()) else {
                continue;
            };
            let cells = value.as_array().ok_or_else(|| SchemaError::Malformed {
                message: format!("column `{column}` is not an array"),
            })?;
            match expected {
                None => expected = Some(cells.len()),
                Some(len) if len != cells.len() => {
                    return Err(SchemaError::RaggedColumn {
                        column: column.name(),
                        expected: len,
                        row: len.min(cells.len()),
                    });
                }
                Some(_) => {}
            }
            table.set_column(column, cells.iter())?;
        }
        table.len = expected.unwrap_or(0);
        Ok(table)
    }

    fn set_column<'a>(
        &mut self,
        column: Column,
        cells: impl Iterator<Item = &'a Value>,
    ) -> SchemaResult<()> {
        match column {
            Column::U => {
                self.u = Some(parse_cells(column, cells, "a node id", |c| {
                    c.as_u64().map(NodeId::new)
                })?)
            }
            Column::V => {
                self.v = Some(parse_cells(column, cells, "a node id", |c| {
                    c.as_u64().map(NodeId::new)
                })?)
            }
            Column::T => self.t = Some(parse_cells(column, cells, "an integer", Value::as_i64)?),
            Column::H => self.h = Some(parse_cells(column, cells, "a number", Value::as_f64)?),
        }
        Ok(())
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether the given column is present.
    pub fn has_column(&self, column: Column) -> bool {
        match column {
            Column::U => self.u.is_some(),
            Column::V => self.v.is_some(),
            Column::T => self.t.is_some(),
            Column::H => self.h.is_some(),
        }
    }

    /// The present columns, in canonical order.
    pub fn columns(&self) -> Vec<Column> {
        Column::ALL
            .into_iter()
            .filter(|c| self.has_column(*c))
            .collect()
    }

    /// Check that every column in `columns` is present.
    pub fn require(&self, columns: &[Column], operation: &'static str) -> SchemaResult<()> {
        match columns.iter().find(|c| !self.has_column(**c)) {
            Some(missing) => Err(missing.missing_for(operation)),
            None => Ok(()),
        }
    }

    /// The `u` column.
    pub fn sources(&self) -> Option<&[NodeId]> {
        self.u.as_deref()
    }

    /// The `v` column.
    pub fn targets(&self) -> Option<&[NodeId]> {
        self.v.as_deref()
    }

    /// The `t` column.
    pub fn timestamps(&self) -> Option<&[i64]> {
        self.t.as_deref()
    }

    /// The `h` column.
    pub fn weights(&self) -> Option<&[f64]> {
        self.h.as_deref()
    }

    /// A copy of the table without the rows whose `(u, v)` is in `pairs`.
    ///
    /// Used to derive a training table once test edges have been held out.
    /// Every present column is carried over; row order is preserved.
    pub fn without_pairs(
        &self,
        pairs: impl IntoIterator<Item = (NodeId, NodeId)>,
    ) -> SchemaResult<Self> {
        const OPERATION: &str = "without_pairs";
        let u = self.sources().ok_or_else(|| Column::U.missing_for(OPERATION))?;
        let v = self.targets().ok_or_else(|| Column::V.missing_for(OPERATION))?;

        let held_out: HashSet<(NodeId, NodeId)> = pairs.into_iter().collect();
        let keep: Vec<usize> = (0..self.len)
            .filter(|&row| !held_out.contains(&(u[row], v[row])))
            .collect();

        tracing::debug!(
            rows = self.len,
            kept = keep.len(),
            held_out = held_out.len(),
            "split off held-out pairs"
        );
        Ok(self.take(&keep))
    }

    fn take(&self, rows: &[usize]) -> Self {
        fn pick<T: Copy>(column: &Option<Vec<T>>, rows: &[usize]) -> Option<Vec<T>> {
            column
                .as_ref()
                .map(|values| rows.iter().map(|&row| values[row]).collect())
        }
        Self {
            len: rows.len(),
            u: pick(&self.u, rows),
            v: pick(&self.v, rows),
            t: pick(&self.t, rows),
            h: pick(&self.h, rows),
        }
    }

    /// Row-object JSON carrying only the present columns.
    pub fn to_json_value(&self) -> Value {
        let rows = (0..self.len)
            .map(|row| {
                let mut object = Map::new();
                if let Some(u) = &self.u {
                    object.insert("u".into(), Value::from(u[row].get()));
                }
                if let Some(v) = &self.v {
                    object.insert("v".into(), Value::from(v[row].get()));
                }
                if let Some(t) = &self.t {
                    object.insert("t".into(), Value::from(t[row]));
                }
                if let Some(h) = &self.h {
                    object.insert("h".into(), Value::from(h[row]));
                }
                Value::Object(object)
            })
            .collect();
        Value::Array(rows)
    }
}

fn parse_cells<'a, T>(
    column: Column,
    cells: impl Iterator<Item = &'a Value>,
    expected: &str,
    parse: impl Fn(&Value) -> Option<T>,
) -> SchemaResult<Vec<T>> {
    cells
        .enumerate()
        .map(|(row, cell)| {
            parse(cell).ok_or_else(|| SchemaError::InvalidValue {
                column: column.name(),
                row,
                message: format!("expected {expected}, found {cell}"),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(id: u64) -> NodeId {
        NodeId::new(id)
    }

    #[test]
    fn records_fill_every_column() {
        let table = EdgeTable::from_records(&[
            EdgeRecord::new(1, 2, 10, 0.5),
            EdgeRecord::new(1, 3, 11, 1.5),
        ]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.columns(), Column::ALL.to_vec());
        assert_eq!(table.targets().unwrap(), &[n(2), n(3)]);
        assert_eq!(table.timestamps().unwrap(), &[10, 11]);
    }

    #[test]
    fn pairs_only_carry_u_and_v() {
        let table = EdgeTable::from_pairs([(n(1), n(2))]);
        assert_eq!(table.columns(), vec![Column::U, Column::V]);
        assert!(table.timestamps().is_none());
        let err = table
            .require(&[Column::U, Column::T], "select_test_edges")
            .unwrap_err();
        assert!(matches!(err, SchemaError::MissingColumn { column: "t", .. }));
    }

    #[test]
    fn row_and_column_json_load_equal_tables() {
        let rows = r#"[{"u": 1, "v": 2, "t": 7, "h": 0.25}, {"u": 3, "v": 1, "t": 2, "h": 1.0}]"#;
        let cols = r#"{"u": [1, 3], "v": [2, 1], "t": [7, 2], "h": [0.25, 1.0]}"#;
        let a = EdgeTable::from_json_str(rows).unwrap();
        let b = EdgeTable::from_json_str(cols).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let table = EdgeTable::from_json_str(r#"[{"u": 1, "v": 2, "label": "x"}]"#).unwrap();
        assert_eq!(table.columns(), vec![Column::U, Column::V]);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = EdgeTable::from_json_str(r#"[{"u": 1, "v": 2, "t": 1}, {"u": 1, "v": 3}]"#)
            .unwrap_err();
        assert!(matches!(
            err,
            SchemaError::RaggedColumn {
                column: "t",
                expected: 2,
                row: 1
            }
        ));
    }

    #[test]
    fn ragged_columns_are_rejected() {
        let err = EdgeTable::from_json_str(r#"{"u": [1, 2], "v": [3]}"#).unwrap_err();
        assert!(matches!(err, SchemaError::RaggedColumn { column: "v", .. }));
    }

    #[test]
    fn invalid_cells_report_row_and_column() {
        let err = EdgeTable::from_json_str(r#"[{"u": 1, "v": 2}, {"u": -4, "v": 2}]"#).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::InvalidValue {
                column: "u",
                row: 1,
                ..
            }
        ));
    }

    #[test]
    fn fractional_timestamps_are_rejected() {
        let err = EdgeTable::from_json_str(r#"[{"u": 1, "v": 2, "t": 1.5}]"#).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::InvalidValue {
                column: "t",
                row: 0,
                ..
            }
        ));

        let table = EdgeTable::from_json_str(r#"{"u": [1, 1], "v": [2, 3], "t": [-3, 7]}"#).unwrap();
        assert_eq!(table.timestamps(), Some(&[-3, 7][..]));
    }

    #[test]
    fn non_table_json_is_malformed() {
        assert!(matches!(
            EdgeTable::from_json_str("42").unwrap_err(),
            SchemaError::Malformed { .. }
        ));
        assert!(matches!(
            EdgeTable::from_json_str("[1, 2]").unwrap_err(),
            SchemaError::Malformed { .. }
        ));
        assert!(matches!(
            EdgeTable::from_json_str("{not json").unwrap_err(),
            SchemaError::Malformed { .. }
        ));
    }

    #[test]
    fn without_pairs_drops_every_matching_row() {
        let table = EdgeTable::from_records(&[
            EdgeRecord::new(1, 2, 1, 0.1),
            EdgeRecord::new(1, 3, 2, 0.2),
            EdgeRecord::new(1, 2, 3, 0.3),
            EdgeRecord::new(2, 1, 4, 0.4),
        ]);
        let train = table.without_pairs([(n(1), n(2))]).unwrap();
        assert_eq!(train.len(), 2);
        assert_eq!(train.sources().unwrap(), &[n(1), n(2)]);
        assert_eq!(train.targets().unwrap(), &[n(3), n(1)]);
        assert_eq!(train.weights().unwrap(), &[0.2, 0.4]);
        assert_eq!(train.columns(), Column::ALL.to_vec());
    }

    #[test]
    fn json_export_keeps_present_columns_only() {
        let table = EdgeTable::from_pairs([(n(5), n(6))]);
        let value = table.to_json_value();
        assert_eq!(value, serde_json::json!([{"u": 5, "v": 6}]));
    }
}

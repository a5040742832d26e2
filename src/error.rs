//! Rich diagnostic error types for linkeval.
//!
//! Each concern defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text so callers know exactly which
//! precondition an input violated.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for linkeval.
///
/// Each variant wraps a concern-specific error, preserving the full diagnostic
/// chain (error codes, help text) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum EvalError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Metric(#[from] MetricError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error on {path}: {source}")]
    #[diagnostic(
        code(linkeval::io),
        help("Check that the file exists and is readable (or that its directory is writable).")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Schema errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum SchemaError {
    #[error("missing column `{column}` required by {operation}")]
    #[diagnostic(
        code(linkeval::schema::missing_column),
        help(
            "Edge tables carry the columns u, v, t and h. \
             Add the missing column to the input before calling this operation."
        )
    )]
    MissingColumn {
        column: &'static str,
        operation: &'static str,
    },

    #[error("column `{column}` is ragged: expected {expected} values, row {row} breaks the pattern")]
    #[diagnostic(
        code(linkeval::schema::ragged_column),
        help(
            "A column must be present in every row or in none. \
             In column-oriented input, every column array must have the same length."
        )
    )]
    RaggedColumn {
        column: &'static str,
        expected: usize,
        row: usize,
    },

    #[error("invalid value in column `{column}` at row {row}: {message}")]
    #[diagnostic(
        code(linkeval::schema::invalid_value),
        help("u and v must be non-negative integers, t an integer and h a number.")
    )]
    InvalidValue {
        column: &'static str,
        row: usize,
        message: String,
    },

    #[error("malformed edge table: {message}")]
    #[diagnostic(
        code(linkeval::schema::malformed),
        help(
            "Provide either an array of row objects ([{{\"u\": 1, \"v\": 2}}, ...]) \
             or an object of column arrays ({{\"u\": [1], \"v\": [2]}})."
        )
    )]
    Malformed { message: String },
}

// ---------------------------------------------------------------------------
// Metric errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum MetricError {
    #[error("node {node} has predictions but no ground-truth entry")]
    #[diagnostic(
        code(linkeval::metric::missing_key),
        help(
            "Every key of the predicted mapping must also be a key of the actual mapping. \
             Restrict predictions to nodes present in the ground truth."
        )
    )]
    MissingKey { node: u64 },

    #[error("recall is undefined: denominator is zero over {predicted_keys} predicted node(s) at k={k}")]
    #[diagnostic(
        code(linkeval::metric::degenerate_input),
        help(
            "Recall needs at least one predicted node whose ground-truth set is non-empty, \
             and k must be at least 1."
        )
    )]
    DegenerateInput { predicted_keys: usize, k: usize },
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    #[diagnostic(
        code(linkeval::config::read),
        help("Check that the config file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {message}")]
    #[diagnostic(
        code(linkeval::config::parse),
        help("The config must be valid TOML with [selection] and [recall] tables.")
    )]
    Parse { path: String, message: String },

    #[error("failed to serialize config {path}: {message}")]
    #[diagnostic(
        code(linkeval::config::serialize),
        help("TOML integers are signed 64-bit; keep every value at or below i64::MAX.")
    )]
    Serialize { path: String, message: String },

    #[error("failed to write config {path}: {source}")]
    #[diagnostic(
        code(linkeval::config::write),
        help("Ensure the target directory exists and is writable.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {message}")]
    #[diagnostic(code(linkeval::config::invalid), help("{message}"))]
    Invalid { message: String },
}

/// Result type for schema-checked table operations.
pub type SchemaResult<T> = std::result::Result<T, SchemaError>;

/// Result type for metric computations.
pub type MetricResult<T> = std::result::Result<T, MetricError>;

/// Result type for configuration handling.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Convenience alias for functions returning linkeval results.
pub type EvalResult<T> = std::result::Result<T, EvalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_error_converts_to_eval_error() {
        let err = SchemaError::MissingColumn {
            column: "t",
            operation: "select_test_edges",
        };
        let eval: EvalError = err.into();
        assert!(matches!(
            eval,
            EvalError::Schema(SchemaError::MissingColumn { column: "t", .. })
        ));
    }

    #[test]
    fn metric_error_converts_to_eval_error() {
        let err = MetricError::MissingKey { node: 7 };
        let eval: EvalError = err.into();
        assert!(matches!(eval, EvalError::Metric(MetricError::MissingKey { node: 7 })));
    }

    #[test]
    fn error_display_messages_are_descriptive() {
        let err = SchemaError::MissingColumn {
            column: "h",
            operation: "build_graph",
        };
        let msg = format!("{err}");
        assert!(msg.contains("`h`"));
        assert!(msg.contains("build_graph"));

        let err = MetricError::DegenerateInput {
            predicted_keys: 0,
            k: 10,
        };
        assert!(format!("{err}").contains("k=10"));
    }
}

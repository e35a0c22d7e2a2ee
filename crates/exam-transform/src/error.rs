//! Error types for preprocessing operations.

use std::path::PathBuf;

use exam_model::SchemaError;
use thiserror::Error;

/// Errors raised while building, fitting, applying or persisting transformers.
#[derive(Debug, Error)]
pub enum TransformError {
    // === Configuration Errors ===
    /// A pipeline or column transformer was declared inconsistently.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    /// The feature schema is inconsistent.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    // === Data Errors ===
    /// A transformer was fit on a table without rows.
    #[error("cannot fit {step} on empty data")]
    EmptyData { step: &'static str },

    /// Input table lacks columns the transformer routes.
    #[error("columns not found: {}", columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    /// A column expected to hold numbers holds something else.
    #[error("column '{column}' contains non-numeric values")]
    NotNumeric { column: String },

    /// A step that cannot handle nulls received some.
    #[error("column '{column}' contains missing values at the {step} step")]
    MissingValues { column: String, step: &'static str },

    /// A category not seen during fit, with unknown handling set to error.
    #[error("unknown category '{value}' in column '{column}'")]
    UnknownCategory { column: String, value: String },

    /// Column count differs from the count seen during fit.
    #[error("feature mismatch: expected {expected} features, got {got}")]
    FeatureMismatch { expected: usize, got: usize },

    /// Row counts of two blocks that must align differ.
    #[error("row count mismatch: expected {expected} rows, got {got}")]
    RowMismatch { expected: usize, got: usize },

    /// ndarray reshape or concatenation failed.
    #[error("array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },

    // === Artifact Errors ===
    /// Reading or writing the artifact file failed.
    #[error("artifact I/O failed for {path}: {source}")]
    ArtifactIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The artifact could not be encoded or decoded.
    #[error("artifact format error in {path}: {source}")]
    ArtifactFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl TransformError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }
}

impl From<polars::prelude::PolarsError> for TransformError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for preprocessing operations.
pub type Result<T> = std::result::Result<T, TransformError>;

//! Error types for exam-score data ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading and splitting input tables.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// CSV file not found.
    #[error("CSV file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === CSV Parsing Errors ===
    /// Failed to parse CSV with Polars.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// CSV file has a header but no data rows.
    #[error("CSV file has no data rows: {path}")]
    EmptyDataFrame { path: PathBuf },

    /// A header cell is blank.
    #[error("CSV file has an empty column name: {path}")]
    EmptyColumnName { path: PathBuf },

    // === Schema Errors ===
    /// One or more required columns are absent from a table.
    #[error("{table} table is missing required columns: {}", columns.join(", "))]
    MissingColumns { table: String, columns: Vec<String> },

    // === DataFrame Errors ===
    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for IngestError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::FileNotFound {
            path: PathBuf::from("/data/train.csv"),
        };
        assert_eq!(err.to_string(), "CSV file not found: /data/train.csv");
    }

    #[test]
    fn test_missing_columns_display_lists_all() {
        let err = IngestError::MissingColumns {
            table: "test".to_string(),
            columns: vec!["lunch".to_string(), "math_score".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "test table is missing required columns: lunch, math_score"
        );
    }

    #[test]
    fn test_error_from_polars() {
        let polars_err = polars::prelude::PolarsError::ColumnNotFound("gender".into());
        let ingest_err: IngestError = polars_err.into();
        assert!(matches!(ingest_err, IngestError::DataFrame { .. }));
    }
}

//! Schema checks and the feature/target split.

use exam_model::FeatureSchema;
use polars::prelude::{Column, DataFrame};

use crate::error::{IngestError, Result};

/// A table separated into its feature columns and its target column.
#[derive(Debug, Clone)]
pub struct SplitTable {
    /// Every column except the target.
    pub features: DataFrame,
    /// The target column, unchanged.
    pub target: Column,
}

impl SplitTable {
    pub fn record_count(&self) -> usize {
        self.features.height()
    }
}

/// Columns from `required` that `df` does not provide, in `required` order.
pub fn missing_columns<'a>(df: &DataFrame, required: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let present = df.get_column_names();
    required
        .into_iter()
        .filter(|column| !present.iter().any(|name| name.as_str() == *column))
        .map(str::to_string)
        .collect()
}

/// Fail with [`IngestError::MissingColumns`] unless every schema column is present.
pub fn require_columns(df: &DataFrame, schema: &FeatureSchema, table: &str) -> Result<()> {
    let missing = missing_columns(df, schema.required_columns());
    if missing.is_empty() {
        Ok(())
    } else {
        Err(IngestError::MissingColumns {
            table: table.to_string(),
            columns: missing,
        })
    }
}

/// Split `df` into feature columns (all but the target) and the target column.
pub fn split_features_target(df: &DataFrame, target: &str) -> Result<SplitTable> {
    let target_column = df
        .column(target)
        .map_err(|_| IngestError::MissingColumns {
            table: "input".to_string(),
            columns: vec![target.to_string()],
        })?
        .clone();
    let features = df.drop(target)?;
    Ok(SplitTable {
        features,
        target: target_column,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{IntoColumn, NamedFrom, Series};

    fn frame(columns: &[&str]) -> DataFrame {
        let cols: Vec<Column> = columns
            .iter()
            .map(|name| Series::new((*name).into(), vec![1.0f64, 2.0]).into_column())
            .collect();
        DataFrame::new(cols).unwrap()
    }

    #[test]
    fn missing_columns_preserves_required_order() {
        let df = frame(&["b"]);
        assert_eq!(missing_columns(&df, ["c", "b", "a"]), vec!["c", "a"]);
    }

    #[test]
    fn require_columns_reports_every_gap() {
        let df = frame(&["reading_score", "writing_score", "math_score"]);
        let schema = FeatureSchema::student_performance();
        let err = require_columns(&df, &schema, "train").unwrap_err();
        match err {
            IngestError::MissingColumns { table, columns } => {
                assert_eq!(table, "train");
                assert_eq!(columns.len(), 5);
                assert_eq!(columns[0], "gender");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn split_drops_only_the_target() {
        let df = frame(&["x", "y", "target"]);
        let split = split_features_target(&df, "target").unwrap();
        assert_eq!(split.features.width(), 2);
        assert_eq!(split.record_count(), 2);
        assert_eq!(split.target.name().as_str(), "target");
    }

    #[test]
    fn split_without_target_fails() {
        let df = frame(&["x"]);
        assert!(matches!(
            split_features_target(&df, "target"),
            Err(IngestError::MissingColumns { .. })
        ));
    }
}

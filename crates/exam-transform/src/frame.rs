//! Conversions between Polars columns and plain value vectors.

use ndarray::Array2;
use polars::prelude::{Column, DataFrame, DataType, IntoColumn, NamedFrom, Series};

use crate::error::{Result, TransformError};

/// Read a column as optional floats, failing on values that do not parse.
pub fn numeric_values(column: &Column) -> Result<Vec<Option<f64>>> {
    let cast = column
        .strict_cast(&DataType::Float64)
        .map_err(|_| TransformError::NotNumeric {
            column: column.name().to_string(),
        })?;
    Ok(cast.f64()?.into_iter().collect())
}

/// Read a column as optional strings; numbers are rendered as text.
pub fn text_values(column: &Column) -> Result<Vec<Option<String>>> {
    let cast = column.cast(&DataType::String)?;
    Ok(cast
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect())
}

pub(crate) fn float_column(name: &str, values: Vec<f64>) -> Column {
    Series::new(name.into(), values).into_column()
}

pub(crate) fn text_column(name: &str, values: Vec<String>) -> Column {
    Series::new(name.into(), values).into_column()
}

pub(crate) fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect()
}

/// Project `df` onto `columns`, in that order.
pub fn select_columns(df: &DataFrame, columns: &[String]) -> Result<DataFrame> {
    let present = df.get_column_names();
    let missing: Vec<String> = columns
        .iter()
        .filter(|column| !present.iter().any(|name| name.as_str() == column.as_str()))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(TransformError::MissingColumns { columns: missing });
    }
    Ok(df.select(columns.iter().map(String::as_str))?)
}

/// Convert every column of `df` to a dense row-major float matrix.
///
/// Nulls are rejected: impute before reaching a matrix step.
pub fn frame_to_matrix(df: &DataFrame, step: &'static str) -> Result<Array2<f64>> {
    let rows = df.height();
    let mut columns = Vec::with_capacity(df.width());
    for column in df.get_columns() {
        let values = numeric_values(column)?
            .into_iter()
            .collect::<Option<Vec<f64>>>()
            .ok_or_else(|| TransformError::MissingValues {
                column: column.name().to_string(),
                step,
            })?;
        columns.push(values);
    }
    Ok(Array2::from_shape_fn((rows, columns.len()), |(row, col)| {
        columns[col][row]
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> DataFrame {
        DataFrame::new(vec![
            Series::new("score".into(), vec![Some(1i64), None, Some(3)]).into_column(),
            Series::new("label".into(), vec!["a", "b", "c"]).into_column(),
        ])
        .unwrap()
    }

    #[test]
    fn numeric_values_keep_nulls() {
        let df = frame();
        let values = numeric_values(df.column("score").unwrap()).unwrap();
        assert_eq!(values, vec![Some(1.0), None, Some(3.0)]);
    }

    #[test]
    fn numeric_values_reject_words() {
        let df = frame();
        let err = numeric_values(df.column("label").unwrap()).unwrap_err();
        assert!(matches!(err, TransformError::NotNumeric { ref column } if column == "label"));
    }

    #[test]
    fn text_values_render_numbers() {
        let df = frame();
        let values = text_values(df.column("score").unwrap()).unwrap();
        assert_eq!(values, vec![Some("1".to_string()), None, Some("3".to_string())]);
    }

    #[test]
    fn select_reports_missing() {
        let df = frame();
        let err = select_columns(&df, &["label".to_string(), "lunch".to_string()]).unwrap_err();
        assert!(matches!(err, TransformError::MissingColumns { ref columns } if columns == &["lunch"]));
    }

    #[test]
    fn matrix_requires_complete_values() {
        let df = frame();
        let only_score = select_columns(&df, &["score".to_string()]).unwrap();
        assert!(matches!(
            frame_to_matrix(&only_score, "scale"),
            Err(TransformError::MissingValues { .. })
        ));
    }

    #[test]
    fn matrix_is_row_major() {
        let df = DataFrame::new(vec![
            float_column("a", vec![1.0, 2.0]),
            float_column("b", vec![10.0, 20.0]),
        ])
        .unwrap();
        let matrix = frame_to_matrix(&df, "scale").unwrap();
        assert_eq!(matrix.shape(), &[2, 2]);
        assert_eq!(matrix[[1, 0]], 2.0);
        assert_eq!(matrix[[0, 1]], 10.0);
    }
}

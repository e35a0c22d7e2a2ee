//! Appending the target column to a transformed feature array.

use ndarray::{Array2, Axis, concatenate};
use polars::prelude::Column;

use crate::error::{Result, TransformError};
use crate::frame::numeric_values;

/// Return `features` with `target` appended as the last column.
///
/// The target must be numeric and complete; a missing label is an error.
pub fn append_target(features: &Array2<f64>, target: &Column) -> Result<Array2<f64>> {
    if features.nrows() != target.len() {
        return Err(TransformError::RowMismatch {
            expected: features.nrows(),
            got: target.len(),
        });
    }
    let values = numeric_values(target)?
        .into_iter()
        .collect::<Option<Vec<f64>>>()
        .ok_or_else(|| TransformError::MissingValues {
            column: target.name().to_string(),
            step: "target",
        })?;
    let target = Array2::from_shape_vec((values.len(), 1), values)?;
    Ok(concatenate(Axis(1), &[features.view(), target.view()])?)
}

//! Input columns of a fitted preprocessor, labeled with their schema role.

use exam_model::{ColumnRole, FeatureSchema};
use exam_transform::FittedColumnTransformer;

/// One column routed into a branch of a fitted preprocessor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputColumn {
    pub branch: String,
    pub column: String,
    /// `None` when `schema` does not name the column.
    pub role: Option<ColumnRole>,
}

/// List the routed columns of `preprocessor` in branch order.
pub fn input_columns(
    preprocessor: &FittedColumnTransformer,
    schema: &FeatureSchema,
) -> Vec<InputColumn> {
    preprocessor
        .branches()
        .iter()
        .flat_map(|branch| {
            branch.columns.iter().map(|column| InputColumn {
                branch: branch.name.clone(),
                column: column.clone(),
                role: schema.role_of(column),
            })
        })
        .collect()
}

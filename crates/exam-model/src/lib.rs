//! Data model for the student exam-score preprocessing workspace.

pub mod error;
pub mod schema;

pub use error::{Result, SchemaError};
pub use schema::{
    CATEGORICAL_COLUMNS, ColumnRole, FeatureSchema, NUMERICAL_COLUMNS, TARGET_COLUMN,
};

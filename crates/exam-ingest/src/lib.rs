//! Loading of train/test tables for the exam-score preprocessing pipeline.

pub mod csv;
pub mod error;
pub mod split;

pub use csv::{read_csv_table, validate_dataframe_shape};
pub use error::{IngestError, Result};
pub use split::{SplitTable, missing_columns, require_columns, split_features_target};

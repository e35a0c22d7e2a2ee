//! Column-wise preprocessing for exam-score tables.
//!
//! The building blocks mirror a familiar fit/transform design:
//!
//! - [`SimpleImputer`] fills missing cells (median, mean, most frequent, constant).
//! - [`OneHotEncoder`] turns string categories into indicator columns.
//! - [`StandardScaler`] divides by the learned standard deviation, optionally
//!   after centering.
//! - [`Pipeline`] chains named steps; [`ColumnTransformer`] routes column
//!   groups to pipelines and stacks their outputs.
//!
//! [`build_preprocessor`] assembles the fixed two-branch preprocessor for the
//! student dataset, and [`save_preprocessor`] / [`load_preprocessor`] persist
//! the fitted result.

pub mod artifact;
pub mod column_transformer;
pub mod encoding;
pub mod error;
pub mod frame;
pub mod imputation;
pub mod pipeline;
pub mod preprocessor;
pub mod scaling;
pub mod target;

pub use artifact::{ArtifactReceipt, DEFAULT_ARTIFACT_PATH, load_preprocessor, save_preprocessor};
pub use column_transformer::{Branch, ColumnTransformer, FittedBranch, FittedColumnTransformer};
pub use encoding::{FittedOneHotEncoder, HandleUnknown, OneHotEncoder};
pub use error::{Result, TransformError};
pub use imputation::{
    FillValue, FittedSimpleImputer, ImputeStrategy, MISSING_TEXT_FILL, SimpleImputer,
};
pub use pipeline::{FittedNamedStep, FittedPipeline, FittedStep, NamedStep, Pipeline, Step};
pub use preprocessor::{
    CATEGORICAL_BRANCH, NUMERIC_BRANCH, build_preprocessor, categorical_pipeline,
    numeric_pipeline,
};
pub use scaling::{FittedStandardScaler, StandardScaler, StandardScalerConfig};
pub use target::append_target;

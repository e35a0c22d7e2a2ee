//! Train/test preprocessing for exam-score tables.
//!
//! [`DataTransformation`] reads a train and a test table, fits the
//! preprocessor on the training features, transforms both tables, appends the
//! target and persists the fitted preprocessor.

pub mod config;
pub mod export;
pub mod inspect;
pub mod logging;
pub mod pipeline;

pub use config::{DataTransformationConfig, FitPolicy};
pub use pipeline::{
    AppliedOutput, DataTransformation, DataTransformationError, StageCause, TransformStage,
    TransformationOutput, apply_preprocessor,
};

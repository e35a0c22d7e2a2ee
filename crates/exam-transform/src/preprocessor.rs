//! The fixed preprocessor for the exam-score dataset.

use exam_model::FeatureSchema;
use tracing::info;

use crate::column_transformer::{Branch, ColumnTransformer};
use crate::encoding::{HandleUnknown, OneHotEncoder};
use crate::error::Result;
use crate::imputation::{ImputeStrategy, SimpleImputer};
use crate::pipeline::{Pipeline, Step};
use crate::scaling::StandardScaler;

pub const NUMERIC_BRANCH: &str = "num_pipeline";
pub const CATEGORICAL_BRANCH: &str = "cat_pipeline";

/// Median imputation followed by scaling without centering.
pub fn numeric_pipeline() -> Result<Pipeline> {
    Pipeline::new([
        (
            "imputer",
            Step::Impute(SimpleImputer::new(ImputeStrategy::Median)),
        ),
        ("scaler", Step::Scale(StandardScaler::new().with_mean(false))),
    ])
}

/// Most-frequent imputation, one-hot encoding, then scaling without
/// centering so indicator zeros stay zero.
///
/// Categories absent from the fitted vocabulary encode as all zeros.
pub fn categorical_pipeline() -> Result<Pipeline> {
    Pipeline::new([
        (
            "imputer",
            Step::Impute(SimpleImputer::new(ImputeStrategy::MostFrequent)),
        ),
        (
            "one_hot_encoder",
            Step::OneHotEncode(OneHotEncoder::new().with_handle_unknown(HandleUnknown::Ignore)),
        ),
        ("scaler", Step::Scale(StandardScaler::new().with_mean(false))),
    ])
}

/// Route the schema's numeric and categorical columns through their pipelines.
pub fn build_preprocessor(schema: &FeatureSchema) -> Result<ColumnTransformer> {
    info!(columns = ?schema.numerical(), "numerical columns");
    info!(columns = ?schema.categorical(), "categorical columns");

    ColumnTransformer::new(vec![
        Branch::new(NUMERIC_BRANCH, numeric_pipeline()?, schema.numerical().to_vec()),
        Branch::new(
            CATEGORICAL_BRANCH,
            categorical_pipeline()?,
            schema.categorical().to_vec(),
        ),
    ])
}

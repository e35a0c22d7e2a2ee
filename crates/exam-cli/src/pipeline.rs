//! The data transformation operation: build, fit, apply and persist the
//! preprocessor for a train/test pair.
//!
//! Every failure is reported as a [`DataTransformationError`] naming the
//! stage that failed, with the underlying ingest or transform error as its
//! source.

use std::fmt;
use std::path::{Path, PathBuf};

use exam_ingest::{IngestError, read_csv_table, require_columns, split_features_target};
use exam_model::FeatureSchema;
use exam_transform::{
    ArtifactReceipt, ColumnTransformer, FittedColumnTransformer, TransformError, append_target,
    build_preprocessor, load_preprocessor, save_preprocessor,
};
use ndarray::Array2;
use polars::prelude::DataFrame;
use thiserror::Error;
use tracing::{debug, info, info_span, warn};

use crate::config::{DataTransformationConfig, FitPolicy};

/// Step of the operation at which an error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformStage {
    ReadInput,
    BuildPreprocessor,
    SplitTarget,
    FitTransform,
    TransformTest,
    AppendTarget,
    SaveArtifact,
    LoadArtifact,
    ApplyArtifact,
}

impl fmt::Display for TransformStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransformStage::ReadInput => "read input data",
            TransformStage::BuildPreprocessor => "build preprocessor",
            TransformStage::SplitTarget => "split target column",
            TransformStage::FitTransform => "fit preprocessor",
            TransformStage::TransformTest => "transform test data",
            TransformStage::AppendTarget => "append target column",
            TransformStage::SaveArtifact => "save preprocessor",
            TransformStage::LoadArtifact => "load preprocessor",
            TransformStage::ApplyArtifact => "apply preprocessor",
        };
        f.write_str(label)
    }
}

/// Underlying cause of a [`DataTransformationError`].
#[derive(Debug, Error)]
pub enum StageCause {
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error(transparent)]
    Transform(#[from] TransformError),
}

/// Uniform error of the data transformation operation.
#[derive(Debug, Error)]
#[error("data transformation failed at stage '{stage}'")]
pub struct DataTransformationError {
    pub stage: TransformStage,
    #[source]
    pub source: StageCause,
}

pub type Result<T> = std::result::Result<T, DataTransformationError>;

trait AtStage<T> {
    fn at(self, stage: TransformStage) -> Result<T>;
}

impl<T, E: Into<StageCause>> AtStage<T> for std::result::Result<T, E> {
    fn at(self, stage: TransformStage) -> Result<T> {
        self.map_err(|e| DataTransformationError {
            stage,
            source: e.into(),
        })
    }
}

/// Result of [`DataTransformation::initiate_data_transformation`].
#[derive(Debug, Clone)]
pub struct TransformationOutput {
    /// Transformed training features with the target as the last column.
    pub train_array: Array2<f64>,
    /// Transformed test features with the target as the last column.
    pub test_array: Array2<f64>,
    /// Where the fitted preprocessor was written.
    pub preprocessor_path: PathBuf,
    /// Output feature names of the training fit, excluding the target.
    pub feature_names: Vec<String>,
    /// Output feature names of the fit that encoded the test table. Equal to
    /// `feature_names` unless the test table was refit.
    pub test_feature_names: Vec<String>,
    pub target: String,
    pub artifact: ArtifactReceipt,
    pub fit_policy: FitPolicy,
}

impl TransformationOutput {
    /// Header for the exported training array: feature names, then the target.
    pub fn train_header(&self) -> Vec<String> {
        with_target(&self.feature_names, &self.target)
    }

    /// Header for the exported test array.
    pub fn test_header(&self) -> Vec<String> {
        with_target(&self.test_feature_names, &self.target)
    }
}

fn with_target(features: &[String], target: &str) -> Vec<String> {
    features
        .iter()
        .cloned()
        .chain(std::iter::once(target.to_string()))
        .collect()
}

/// Builds the preprocessor and applies it to train/test tables.
#[derive(Debug, Clone, Default)]
pub struct DataTransformation {
    config: DataTransformationConfig,
    schema: FeatureSchema,
}

impl DataTransformation {
    /// Operation over the student exam-score schema.
    pub fn new(config: DataTransformationConfig) -> Self {
        Self {
            config,
            schema: FeatureSchema::student_performance(),
        }
    }

    #[must_use]
    pub fn with_schema(mut self, schema: FeatureSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn config(&self) -> &DataTransformationConfig {
        &self.config
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// The unfitted two-branch preprocessor for this schema.
    pub fn get_data_transformer_object(&self) -> Result<ColumnTransformer> {
        build_preprocessor(&self.schema).at(TransformStage::BuildPreprocessor)
    }

    /// Fit on the training table, transform both tables, append the target
    /// and persist the training fit.
    pub fn initiate_data_transformation(
        &self,
        train_path: &Path,
        test_path: &Path,
    ) -> Result<TransformationOutput> {
        let span = info_span!("data_transformation", fit_policy = %self.config.fit_policy);
        let _guard = span.enter();

        let train_df = self.read_table(train_path, "train")?;
        let test_df = self.read_table(test_path, "test")?;
        info!(
            train_rows = train_df.height(),
            test_rows = test_df.height(),
            "read train and test data completed"
        );

        info!("obtaining preprocessing object");
        let preprocessor = self.get_data_transformer_object()?;

        let target = self.schema.target();
        let train = split_features_target(&train_df, target).at(TransformStage::SplitTarget)?;
        let test = split_features_target(&test_df, target).at(TransformStage::SplitTarget)?;

        info!("applying preprocessing object on training and testing dataframes");
        let (fitted, train_features) = preprocessor
            .fit_transform(&train.features)
            .at(TransformStage::FitTransform)?;
        let (test_feature_names, test_features) = match self.config.fit_policy {
            FitPolicy::TrainOnly => fitted
                .transform(&test.features)
                .map(|features| (fitted.feature_names_out(), features)),
            FitPolicy::RefitOnTest => preprocessor
                .fit_transform(&test.features)
                .map(|(refit, features)| (refit.feature_names_out(), features)),
        }
        .at(TransformStage::TransformTest)?;
        if test_features.ncols() != train_features.ncols() {
            warn!(
                train_features = train_features.ncols(),
                test_features = test_features.ncols(),
                "train and test arrays have different widths"
            );
        }

        let train_array =
            append_target(&train_features, &train.target).at(TransformStage::AppendTarget)?;
        let test_array =
            append_target(&test_features, &test.target).at(TransformStage::AppendTarget)?;

        let artifact = save_preprocessor(&fitted, &self.config.preprocessor_path)
            .at(TransformStage::SaveArtifact)?;
        info!(
            path = %artifact.path.display(),
            bytes = artifact.bytes,
            sha256 = %artifact.sha256,
            "saved preprocessing object"
        );

        Ok(TransformationOutput {
            train_array,
            test_array,
            preprocessor_path: artifact.path.clone(),
            feature_names: fitted.feature_names_out(),
            test_feature_names,
            target: target.to_string(),
            artifact,
            fit_policy: self.config.fit_policy,
        })
    }

    fn read_table(&self, path: &Path, table: &str) -> Result<DataFrame> {
        let df = read_csv_table(path).at(TransformStage::ReadInput)?;
        require_columns(&df, &self.schema, table).at(TransformStage::ReadInput)?;
        debug!(table, path = %path.display(), rows = df.height(), "input table ready");
        Ok(df)
    }
}

/// Result of applying a persisted preprocessor to a new table.
#[derive(Debug, Clone)]
pub struct AppliedOutput {
    pub array: Array2<f64>,
    /// Column names of `array`, target last when one was appended.
    pub header: Vec<String>,
    pub preprocessor: FittedColumnTransformer,
}

/// Transform the table at `data_path` with the preprocessor at
/// `artifact_path`, appending `target` as the last column when given.
pub fn apply_preprocessor(
    artifact_path: &Path,
    data_path: &Path,
    target: Option<&str>,
) -> Result<AppliedOutput> {
    let preprocessor = load_preprocessor(artifact_path).at(TransformStage::LoadArtifact)?;
    let df = read_csv_table(data_path).at(TransformStage::ReadInput)?;
    let features = preprocessor
        .transform(&df)
        .at(TransformStage::ApplyArtifact)?;

    let mut header = preprocessor.feature_names_out();
    let array = match target {
        Some(target) => {
            let split = split_features_target(&df, target).at(TransformStage::SplitTarget)?;
            header.push(target.to_string());
            append_target(&features, &split.target).at(TransformStage::AppendTarget)?
        }
        None => features,
    };
    info!(
        artifact = %artifact_path.display(),
        rows = array.nrows(),
        columns = array.ncols(),
        "applied persisted preprocessor"
    );

    Ok(AppliedOutput {
        array,
        header,
        preprocessor,
    })
}

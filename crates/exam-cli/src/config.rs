//! Configuration for the data transformation operation.

use std::fmt;
use std::path::PathBuf;

use exam_transform::DEFAULT_ARTIFACT_PATH;

/// How the test table is transformed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FitPolicy {
    /// Fit once on training features; the test table reuses those parameters.
    #[default]
    TrainOnly,
    /// Fit an independent copy of the preprocessor on the test features.
    ///
    /// Test statistics then differ from the training ones and the one-hot
    /// width can differ when the category sets differ. The persisted
    /// artifact is still the training fit.
    RefitOnTest,
}

impl fmt::Display for FitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FitPolicy::TrainOnly => f.write_str("train-only"),
            FitPolicy::RefitOnTest => f.write_str("refit-on-test"),
        }
    }
}

/// Where to persist the fitted preprocessor and how to fit it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataTransformationConfig {
    pub preprocessor_path: PathBuf,
    pub fit_policy: FitPolicy,
}

impl Default for DataTransformationConfig {
    fn default() -> Self {
        Self {
            preprocessor_path: PathBuf::from(DEFAULT_ARTIFACT_PATH),
            fit_policy: FitPolicy::default(),
        }
    }
}

impl DataTransformationConfig {
    #[must_use]
    pub fn with_preprocessor_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.preprocessor_path = path.into();
        self
    }

    #[must_use]
    pub fn with_fit_policy(mut self, policy: FitPolicy) -> Self {
        self.fit_policy = policy;
        self
    }
}

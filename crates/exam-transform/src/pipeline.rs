//! Ordered composition of named transformer steps.
//!
//! Data moves through a pipeline in one of two shapes: a column-wise
//! [`DataFrame`] before encoding, and a dense matrix after it. Imputation and
//! one-hot encoding consume a frame; scaling consumes a matrix and converts a
//! frame on entry. A pipeline whose steps would ask for a frame after the
//! data has become a matrix is rejected at construction.

use std::collections::BTreeSet;

use ndarray::Array2;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

use crate::encoding::{FittedOneHotEncoder, OneHotEncoder};
use crate::error::{Result, TransformError};
use crate::frame::{column_names, frame_to_matrix};
use crate::imputation::{FittedSimpleImputer, SimpleImputer};
use crate::scaling::{FittedStandardScaler, StandardScaler};

/// Unfitted transformer usable as a pipeline step.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Impute(SimpleImputer),
    OneHotEncode(OneHotEncoder),
    Scale(StandardScaler),
}

impl Step {
    fn kind(&self) -> &'static str {
        match self {
            Step::Impute(_) => "SimpleImputer",
            Step::OneHotEncode(_) => "OneHotEncoder",
            Step::Scale(_) => "StandardScaler",
        }
    }

    fn needs_frame(&self) -> bool {
        matches!(self, Step::Impute(_) | Step::OneHotEncode(_))
    }

    fn yields_matrix(&self) -> bool {
        matches!(self, Step::OneHotEncode(_) | Step::Scale(_))
    }
}

/// Fitted counterpart of [`Step`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FittedStep {
    Impute(FittedSimpleImputer),
    OneHotEncode(FittedOneHotEncoder),
    Scale(FittedStandardScaler),
}

/// Data between two steps.
#[derive(Debug, Clone)]
enum StageData {
    Frame(DataFrame),
    Matrix(Array2<f64>),
}

impl StageData {
    fn frame(&self, step: &'static str) -> Result<&DataFrame> {
        match self {
            StageData::Frame(df) => Ok(df),
            StageData::Matrix(_) => Err(TransformError::invalid(format!(
                "{step} needs column data but received an encoded matrix"
            ))),
        }
    }

    fn into_matrix(self, step: &'static str) -> Result<Array2<f64>> {
        match self {
            StageData::Frame(df) => frame_to_matrix(&df, step),
            StageData::Matrix(matrix) => Ok(matrix),
        }
    }
}

impl FittedStep {
    fn transform(&self, data: StageData) -> Result<StageData> {
        match self {
            FittedStep::Impute(imputer) => Ok(StageData::Frame(
                imputer.transform(data.frame("SimpleImputer")?)?,
            )),
            FittedStep::OneHotEncode(encoder) => Ok(StageData::Matrix(
                encoder.transform(data.frame("OneHotEncoder")?)?,
            )),
            FittedStep::Scale(scaler) => Ok(StageData::Matrix(
                scaler.transform(&data.into_matrix("StandardScaler")?)?,
            )),
        }
    }
}

fn fit_step(step: &Step, data: StageData) -> Result<(FittedStep, StageData)> {
    match step {
        Step::Impute(imputer) => {
            let (fitted, out) = imputer.fit_transform(data.frame("SimpleImputer")?)?;
            Ok((FittedStep::Impute(fitted), StageData::Frame(out)))
        }
        Step::OneHotEncode(encoder) => {
            let (fitted, out) = encoder.fit_transform(data.frame("OneHotEncoder")?)?;
            Ok((FittedStep::OneHotEncode(fitted), StageData::Matrix(out)))
        }
        Step::Scale(scaler) => {
            let (fitted, out) = scaler.fit_transform(&data.into_matrix("StandardScaler")?)?;
            Ok((FittedStep::Scale(fitted), StageData::Matrix(out)))
        }
    }
}

/// A named step.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedStep {
    pub name: String,
    pub step: Step,
}

/// Sequence of steps fit and applied in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    steps: Vec<NamedStep>,
}

impl Pipeline {
    /// Create a pipeline from `(name, step)` pairs.
    ///
    /// Names must be unique and non-empty, and no frame-consuming step may
    /// follow a step that produces a matrix.
    pub fn new<N: Into<String>>(steps: impl IntoIterator<Item = (N, Step)>) -> Result<Self> {
        let steps: Vec<NamedStep> = steps
            .into_iter()
            .map(|(name, step)| NamedStep {
                name: name.into(),
                step,
            })
            .collect();
        if steps.is_empty() {
            return Err(TransformError::invalid("pipeline has no steps"));
        }

        let mut names = BTreeSet::new();
        let mut matrix_from: Option<&str> = None;
        for named in &steps {
            if named.name.trim().is_empty() {
                return Err(TransformError::invalid("pipeline step name is empty"));
            }
            if !names.insert(named.name.as_str()) {
                return Err(TransformError::invalid(format!(
                    "duplicate pipeline step name '{}'",
                    named.name
                )));
            }
            if let Some(producer) = matrix_from
                && named.step.needs_frame()
            {
                return Err(TransformError::invalid(format!(
                    "step '{}' ({}) cannot follow '{producer}', which already produced a matrix",
                    named.name,
                    named.step.kind()
                )));
            }
            if named.step.yields_matrix() && matrix_from.is_none() {
                matrix_from = Some(named.name.as_str());
            }
        }
        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[NamedStep] {
        &self.steps
    }

    pub fn fit(&self, df: &DataFrame) -> Result<FittedPipeline> {
        self.fit_transform(df).map(|(fitted, _)| fitted)
    }

    /// Fit every step on the output of the previous one.
    pub fn fit_transform(&self, df: &DataFrame) -> Result<(FittedPipeline, Array2<f64>)> {
        let mut data = StageData::Frame(df.clone());
        let mut fitted = Vec::with_capacity(self.steps.len());
        for named in &self.steps {
            let (step, out) = fit_step(&named.step, data)?;
            fitted.push(FittedNamedStep {
                name: named.name.clone(),
                step,
            });
            data = out;
        }
        let output = data.into_matrix("Pipeline")?;
        Ok((
            FittedPipeline {
                input_columns: column_names(df),
                steps: fitted,
            },
            output,
        ))
    }
}

/// A named fitted step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedNamedStep {
    pub name: String,
    pub step: FittedStep,
}

/// Pipeline with every step fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedPipeline {
    input_columns: Vec<String>,
    steps: Vec<FittedNamedStep>,
}

impl FittedPipeline {
    pub fn steps(&self) -> &[FittedNamedStep] {
        &self.steps
    }

    pub fn input_columns(&self) -> &[String] {
        &self.input_columns
    }

    /// Look up a fitted step by name.
    pub fn named_step(&self, name: &str) -> Option<&FittedStep> {
        self.steps
            .iter()
            .find(|named| named.name == name)
            .map(|named| &named.step)
    }

    /// Output column names; an encoder replaces the input names with its own.
    pub fn feature_names_out(&self) -> Vec<String> {
        let mut names = self.input_columns.clone();
        for named in &self.steps {
            if let FittedStep::OneHotEncode(encoder) = &named.step {
                names = encoder.feature_names_out();
            }
        }
        names
    }

    pub fn n_features_out(&self) -> usize {
        self.feature_names_out().len()
    }

    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        let mut data = StageData::Frame(df.clone());
        for named in &self.steps {
            data = named.step.transform(data)?;
        }
        data.into_matrix("Pipeline")
    }
}

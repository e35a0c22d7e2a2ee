//! ColumnTransformer implementation.
//!
//! Routes column groups to their own pipelines and concatenates the branch
//! outputs horizontally, in branch order. Columns not routed by any branch
//! are dropped.

use std::collections::BTreeSet;

use ndarray::{Array2, ArrayView2, Axis, concatenate};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, TransformError};
use crate::frame::select_columns;
use crate::pipeline::{FittedPipeline, Pipeline};

/// A pipeline applied to a named group of columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub name: String,
    pub pipeline: Pipeline,
    pub columns: Vec<String>,
}

impl Branch {
    pub fn new(
        name: impl Into<String>,
        pipeline: Pipeline,
        columns: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            pipeline,
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }
}

/// Unfitted column transformer.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnTransformer {
    branches: Vec<Branch>,
}

impl ColumnTransformer {
    /// Create a transformer, rejecting empty or duplicate branches and
    /// columns routed to more than one branch.
    pub fn new(branches: Vec<Branch>) -> Result<Self> {
        if branches.is_empty() {
            return Err(TransformError::invalid("column transformer has no branches"));
        }
        let mut names = BTreeSet::new();
        let mut routed = BTreeSet::new();
        for branch in &branches {
            if !names.insert(branch.name.as_str()) {
                return Err(TransformError::invalid(format!(
                    "duplicate branch name '{}'",
                    branch.name
                )));
            }
            if branch.columns.is_empty() {
                return Err(TransformError::invalid(format!(
                    "branch '{}' routes no columns",
                    branch.name
                )));
            }
            for column in &branch.columns {
                if !routed.insert(column.as_str()) {
                    return Err(TransformError::invalid(format!(
                        "column '{column}' is routed to more than one branch"
                    )));
                }
            }
        }
        Ok(Self { branches })
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn fit(&self, df: &DataFrame) -> Result<FittedColumnTransformer> {
        self.fit_transform(df).map(|(fitted, _)| fitted)
    }

    /// Fit every branch on its columns of `df` and stack the outputs.
    pub fn fit_transform(&self, df: &DataFrame) -> Result<(FittedColumnTransformer, Array2<f64>)> {
        let missing = missing_routed_columns(df, self.branches.iter().flat_map(|b| &b.columns));
        if !missing.is_empty() {
            return Err(TransformError::MissingColumns { columns: missing });
        }

        let mut fitted = Vec::with_capacity(self.branches.len());
        let mut blocks = Vec::with_capacity(self.branches.len());
        for branch in &self.branches {
            let input = select_columns(df, &branch.columns)?;
            let (pipeline, block) = branch.pipeline.fit_transform(&input)?;
            debug!(
                branch = %branch.name,
                rows = block.nrows(),
                features = block.ncols(),
                "fitted column transformer branch"
            );
            fitted.push(FittedBranch {
                name: branch.name.clone(),
                columns: branch.columns.clone(),
                pipeline,
            });
            blocks.push(block);
        }
        let output = hstack(&blocks)?;
        Ok((FittedColumnTransformer { branches: fitted }, output))
    }
}

fn missing_routed_columns<'a>(
    df: &DataFrame,
    routed: impl Iterator<Item = &'a String>,
) -> Vec<String> {
    let present = df.get_column_names();
    routed
        .filter(|column| !present.iter().any(|name| name.as_str() == column.as_str()))
        .cloned()
        .collect()
}

fn hstack(blocks: &[Array2<f64>]) -> Result<Array2<f64>> {
    let views: Vec<ArrayView2<'_, f64>> = blocks.iter().map(Array2::view).collect();
    Ok(concatenate(Axis(1), &views)?)
}

/// A fitted branch with the columns it reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedBranch {
    pub name: String,
    pub columns: Vec<String>,
    pub pipeline: FittedPipeline,
}

impl FittedBranch {
    pub fn n_features_out(&self) -> usize {
        self.pipeline.n_features_out()
    }
}

/// Column transformer with every branch fit; this is what gets persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedColumnTransformer {
    branches: Vec<FittedBranch>,
}

impl FittedColumnTransformer {
    pub fn branches(&self) -> &[FittedBranch] {
        &self.branches
    }

    /// Columns the transformer reads, in branch order.
    pub fn input_columns(&self) -> Vec<&str> {
        self.branches
            .iter()
            .flat_map(|branch| branch.columns.iter().map(String::as_str))
            .collect()
    }

    pub fn n_features_out(&self) -> usize {
        self.branches.iter().map(FittedBranch::n_features_out).sum()
    }

    /// Output names as `<branch>__<feature>`, in output order.
    pub fn feature_names_out(&self) -> Vec<String> {
        self.branches
            .iter()
            .flat_map(|branch| {
                branch
                    .pipeline
                    .feature_names_out()
                    .into_iter()
                    .map(move |feature| format!("{}__{feature}", branch.name))
            })
            .collect()
    }

    /// Apply the learned parameters to a table with the same column schema.
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        let missing = missing_routed_columns(df, self.branches.iter().flat_map(|b| &b.columns));
        if !missing.is_empty() {
            return Err(TransformError::MissingColumns { columns: missing });
        }

        let mut blocks = Vec::with_capacity(self.branches.len());
        for branch in &self.branches {
            let input = select_columns(df, &branch.columns)?;
            blocks.push(branch.pipeline.transform(&input)?);
        }
        hstack(&blocks)
    }
}

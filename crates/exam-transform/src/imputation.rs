//! Simple imputation of missing values.
//!
//! Supports mean, median, most-frequent and constant strategies. Mean and
//! median read the column as numbers; most-frequent reads it as text, so it
//! serves string-valued categorical columns directly.
//!
//! A column with no observed values still gets a fill value: `0.0` for the
//! numeric strategies and [`MISSING_TEXT_FILL`] for most-frequent.

use std::collections::BTreeMap;

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TransformError};
use crate::frame::{column_names, float_column, numeric_values, text_column, text_values};

/// Fill value for a most-frequent column that has no observed values.
pub const MISSING_TEXT_FILL: &str = "missing_value";

/// Strategy for imputing missing values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImputeStrategy {
    Mean,
    Median,
    MostFrequent,
    Constant(FillValue),
}

/// A learned or configured replacement for missing cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillValue {
    Number(f64),
    Text(String),
}

/// Imputer configuration (unfitted).
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleImputer {
    strategy: ImputeStrategy,
}

impl SimpleImputer {
    pub fn new(strategy: ImputeStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> &ImputeStrategy {
        &self.strategy
    }

    /// Learn one fill value per column of `df`.
    pub fn fit(&self, df: &DataFrame) -> Result<FittedSimpleImputer> {
        if df.height() == 0 {
            return Err(TransformError::EmptyData {
                step: "SimpleImputer",
            });
        }

        let mut statistics = Vec::with_capacity(df.width());
        for column in df.get_columns() {
            let fill = match &self.strategy {
                ImputeStrategy::Mean => FillValue::Number(mean(&observed(numeric_values(column)?))),
                ImputeStrategy::Median => {
                    FillValue::Number(median(observed(numeric_values(column)?)))
                }
                ImputeStrategy::MostFrequent => {
                    FillValue::Text(most_frequent(observed(text_values(column)?)))
                }
                ImputeStrategy::Constant(value) => value.clone(),
            };
            statistics.push(fill);
        }

        Ok(FittedSimpleImputer {
            strategy: self.strategy.clone(),
            columns: column_names(df),
            statistics,
        })
    }

    pub fn fit_transform(&self, df: &DataFrame) -> Result<(FittedSimpleImputer, DataFrame)> {
        let fitted = self.fit(df)?;
        let imputed = fitted.transform(df)?;
        Ok((fitted, imputed))
    }
}

fn observed<T>(values: Vec<Option<T>>) -> Vec<T> {
    values.into_iter().flatten().collect()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn median(mut values: Vec<f64>) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(f64::total_cmp);
    let n = values.len();
    if n.is_multiple_of(2) {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    } else {
        values[n / 2]
    }
}

/// Highest count wins; ties go to the lexicographically smallest value.
fn most_frequent(values: Vec<String>) -> String {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }
    let mut best: Option<(String, usize)> = None;
    for (value, count) in counts {
        if best.as_ref().is_none_or(|(_, top)| count > *top) {
            best = Some((value, count));
        }
    }
    best.map_or_else(|| MISSING_TEXT_FILL.to_string(), |(value, _)| value)
}

/// Imputer with learned fill values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedSimpleImputer {
    strategy: ImputeStrategy,
    columns: Vec<String>,
    statistics: Vec<FillValue>,
}

impl FittedSimpleImputer {
    pub fn strategy(&self) -> &ImputeStrategy {
        &self.strategy
    }

    /// Fill value per input column, in input order.
    pub fn statistics(&self) -> &[FillValue] {
        &self.statistics
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn n_features_in(&self) -> usize {
        self.columns.len()
    }

    /// Replace nulls with the learned fill values.
    ///
    /// Columns filled with a number come out as `Float64`, columns filled with
    /// text as `String`.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if df.width() != self.columns.len() {
            return Err(TransformError::FeatureMismatch {
                expected: self.columns.len(),
                got: df.width(),
            });
        }

        let mut filled = Vec::with_capacity(self.columns.len());
        for (name, fill) in self.columns.iter().zip(&self.statistics) {
            let column = df
                .column(name)
                .map_err(|_| TransformError::MissingColumns {
                    columns: vec![name.clone()],
                })?;
            let output = match fill {
                FillValue::Number(value) => float_column(
                    name,
                    numeric_values(column)?
                        .into_iter()
                        .map(|cell| cell.unwrap_or(*value))
                        .collect(),
                ),
                FillValue::Text(value) => text_column(
                    name,
                    text_values(column)?
                        .into_iter()
                        .map(|cell| cell.unwrap_or_else(|| value.clone()))
                        .collect(),
                ),
            };
            filled.push(output);
        }
        Ok(DataFrame::new(filled)?)
    }
}

//! One-hot encoding for categorical features.
//!
//! Each input column is read as text and the sorted set of values seen during
//! fit becomes that column's vocabulary. A row is encoded as one indicator per
//! category, concatenated across columns in input order.

use std::collections::BTreeSet;

use ndarray::Array2;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TransformError};
use crate::frame::{column_names, text_values};

/// Strategy for handling unknown categories during transform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleUnknown {
    /// Raise an error when unknown categories are encountered.
    #[default]
    Error,
    /// Leave every indicator of the column at zero.
    Ignore,
}

/// One-hot encoder configuration (unfitted).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OneHotEncoder {
    handle_unknown: HandleUnknown,
}

impl OneHotEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the strategy for handling unknown categories.
    pub fn with_handle_unknown(mut self, strategy: HandleUnknown) -> Self {
        self.handle_unknown = strategy;
        self
    }

    /// Learn the sorted vocabulary of every column in `df`.
    pub fn fit(&self, df: &DataFrame) -> Result<FittedOneHotEncoder> {
        if df.height() == 0 {
            return Err(TransformError::EmptyData {
                step: "OneHotEncoder",
            });
        }

        let mut categories = Vec::with_capacity(df.width());
        for column in df.get_columns() {
            let mut vocabulary = BTreeSet::new();
            for value in text_values(column)? {
                let value = value.ok_or_else(|| TransformError::MissingValues {
                    column: column.name().to_string(),
                    step: "OneHotEncoder",
                })?;
                vocabulary.insert(value);
            }
            categories.push(vocabulary.into_iter().collect());
        }

        Ok(FittedOneHotEncoder {
            columns: column_names(df),
            categories,
            handle_unknown: self.handle_unknown,
        })
    }

    pub fn fit_transform(&self, df: &DataFrame) -> Result<(FittedOneHotEncoder, Array2<f64>)> {
        let fitted = self.fit(df)?;
        let encoded = fitted.transform(df)?;
        Ok((fitted, encoded))
    }
}

/// One-hot encoder with learned vocabularies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedOneHotEncoder {
    columns: Vec<String>,
    categories: Vec<Vec<String>>,
    handle_unknown: HandleUnknown,
}

impl FittedOneHotEncoder {
    /// Sorted categories per input column.
    pub fn categories(&self) -> &[Vec<String>] {
        &self.categories
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn handle_unknown(&self) -> HandleUnknown {
        self.handle_unknown
    }

    pub fn n_features_in(&self) -> usize {
        self.columns.len()
    }

    pub fn n_features_out(&self) -> usize {
        self.categories.iter().map(Vec::len).sum()
    }

    /// Output names, `<column>_<category>`, in output order.
    pub fn feature_names_out(&self) -> Vec<String> {
        self.columns
            .iter()
            .zip(&self.categories)
            .flat_map(|(column, cats)| cats.iter().map(move |cat| format!("{column}_{cat}")))
            .collect()
    }

    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        if df.width() != self.columns.len() {
            return Err(TransformError::FeatureMismatch {
                expected: self.columns.len(),
                got: df.width(),
            });
        }

        let mut encoded = Array2::zeros((df.height(), self.n_features_out()));
        let mut offset = 0;
        for (name, cats) in self.columns.iter().zip(&self.categories) {
            let column = df
                .column(name)
                .map_err(|_| TransformError::MissingColumns {
                    columns: vec![name.clone()],
                })?;
            for (row, value) in text_values(column)?.into_iter().enumerate() {
                let value = value.ok_or_else(|| TransformError::MissingValues {
                    column: name.clone(),
                    step: "OneHotEncoder",
                })?;
                match cats.binary_search(&value) {
                    Ok(idx) => encoded[[row, offset + idx]] = 1.0,
                    Err(_) if self.handle_unknown == HandleUnknown::Ignore => {}
                    Err(_) => {
                        return Err(TransformError::UnknownCategory {
                            column: name.clone(),
                            value,
                        });
                    }
                }
            }
            offset += cats.len();
        }
        Ok(encoded)
    }
}

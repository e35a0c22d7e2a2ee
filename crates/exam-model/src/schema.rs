//! Column groups of the student exam-score dataset.
//!
//! Every table handled by the workspace carries the same header: two numeric
//! score columns, five categorical demographic columns and the `math_score`
//! target. [`FeatureSchema`] holds those groups as a typed value so the
//! preprocessing code never reaches for global column lists.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaError};

/// Continuous feature columns.
pub const NUMERICAL_COLUMNS: [&str; 2] = ["reading_score", "writing_score"];

/// Discrete, string-valued feature columns.
pub const CATEGORICAL_COLUMNS: [&str; 5] = [
    "gender",
    "race_ethnicity",
    "parental_level_of_education",
    "lunch",
    "test_preparation_course",
];

/// The value predicted by the downstream model.
pub const TARGET_COLUMN: &str = "math_score";

/// Role of a named column within a [`FeatureSchema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnRole {
    Numerical,
    Categorical,
    Target,
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ColumnRole::Numerical => "numerical",
            ColumnRole::Categorical => "categorical",
            ColumnRole::Target => "target",
        })
    }
}

/// Partition of a table's columns into numeric features, categorical
/// features and the target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    numerical: Vec<String>,
    categorical: Vec<String>,
    target: String,
}

impl FeatureSchema {
    /// Create a schema, checking that the groups are non-empty and disjoint.
    pub fn new(
        numerical: impl IntoIterator<Item = impl Into<String>>,
        categorical: impl IntoIterator<Item = impl Into<String>>,
        target: impl Into<String>,
    ) -> Result<Self> {
        let schema = Self {
            numerical: numerical.into_iter().map(Into::into).collect(),
            categorical: categorical.into_iter().map(Into::into).collect(),
            target: target.into(),
        };
        schema.validate()?;
        Ok(schema)
    }

    /// The fixed schema of the student performance dataset.
    pub fn student_performance() -> Self {
        Self {
            numerical: NUMERICAL_COLUMNS.iter().map(|c| (*c).to_string()).collect(),
            categorical: CATEGORICAL_COLUMNS.iter().map(|c| (*c).to_string()).collect(),
            target: TARGET_COLUMN.to_string(),
        }
    }

    pub fn numerical(&self) -> &[String] {
        &self.numerical
    }

    pub fn categorical(&self) -> &[String] {
        &self.categorical
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Feature columns in routing order: numeric first, then categorical.
    pub fn feature_columns(&self) -> impl Iterator<Item = &str> {
        self.numerical
            .iter()
            .chain(self.categorical.iter())
            .map(String::as_str)
    }

    /// Every column a table must provide, target last.
    pub fn required_columns(&self) -> Vec<&str> {
        self.feature_columns()
            .chain(std::iter::once(self.target.as_str()))
            .collect()
    }

    /// Look up the role of a column, if the schema names it.
    pub fn role_of(&self, column: &str) -> Option<ColumnRole> {
        if self.target == column {
            Some(ColumnRole::Target)
        } else if self.numerical.iter().any(|c| c == column) {
            Some(ColumnRole::Numerical)
        } else if self.categorical.iter().any(|c| c == column) {
            Some(ColumnRole::Categorical)
        } else {
            None
        }
    }

    fn validate(&self) -> Result<()> {
        if self.numerical.is_empty() {
            return Err(SchemaError::EmptyGroup { group: "numerical" });
        }
        if self.categorical.is_empty() {
            return Err(SchemaError::EmptyGroup {
                group: "categorical",
            });
        }
        if self.target.trim().is_empty() {
            return Err(SchemaError::EmptyTarget);
        }
        let mut seen = BTreeSet::new();
        for column in self.required_columns() {
            if !seen.insert(column) {
                return Err(SchemaError::DuplicateColumn {
                    column: column.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self::student_performance()
    }
}

//! Standard scaling.
//!
//! Learns the per-feature mean and population standard deviation. With
//! `with_mean(false)` the data is only divided by the scale, which keeps zero
//! entries of indicator columns at zero:
//! ```text
//! z = x / s          (with_mean = false)
//! z = (x - u) / s    (with_mean = true)
//! ```
//! Constant features get a scale of `1.0`.

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TransformError};

/// Standard deviations below this are treated as constant features.
const ZERO_SCALE: f64 = 10.0 * f64::EPSILON;

/// Configuration for [`StandardScaler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardScalerConfig {
    /// Subtract the mean before scaling.
    pub with_mean: bool,
    /// Divide by the standard deviation.
    pub with_std: bool,
}

impl Default for StandardScalerConfig {
    fn default() -> Self {
        Self {
            with_mean: true,
            with_std: true,
        }
    }
}

/// Standard scaler (unfitted).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StandardScaler {
    config: StandardScalerConfig,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to center data by mean.
    pub fn with_mean(mut self, with_mean: bool) -> Self {
        self.config.with_mean = with_mean;
        self
    }

    /// Set whether to scale data to unit variance.
    pub fn with_std(mut self, with_std: bool) -> Self {
        self.config.with_std = with_std;
        self
    }

    pub fn config(&self) -> StandardScalerConfig {
        self.config
    }

    pub fn fit(&self, data: &Array2<f64>) -> Result<FittedStandardScaler> {
        let (rows, cols) = data.dim();
        if rows == 0 {
            return Err(TransformError::EmptyData {
                step: "StandardScaler",
            });
        }
        if data.iter().any(|v| !v.is_finite()) {
            return Err(TransformError::MissingValues {
                column: "<matrix>".to_string(),
                step: "StandardScaler",
            });
        }

        let mean = data
            .mean_axis(Axis(0))
            .unwrap_or_else(|| Array1::zeros(cols));
        let scale = if self.config.with_std {
            data.std_axis(Axis(0), 0.0)
                .mapv(|s| if s < ZERO_SCALE { 1.0 } else { s })
        } else {
            Array1::ones(cols)
        };

        Ok(FittedStandardScaler {
            config: self.config,
            mean: mean.to_vec(),
            scale: scale.to_vec(),
        })
    }

    pub fn fit_transform(&self, data: &Array2<f64>) -> Result<(FittedStandardScaler, Array2<f64>)> {
        let fitted = self.fit(data)?;
        let scaled = fitted.transform(data)?;
        Ok((fitted, scaled))
    }
}

/// Standard scaler with learned statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedStandardScaler {
    config: StandardScalerConfig,
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl FittedStandardScaler {
    pub fn config(&self) -> StandardScalerConfig {
        self.config
    }

    /// Per-feature mean seen during fit (learned even when not subtracted).
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    /// Per-feature divisor.
    pub fn scale(&self) -> &[f64] {
        &self.scale
    }

    pub fn n_features_in(&self) -> usize {
        self.scale.len()
    }

    fn check_width(&self, data: &Array2<f64>) -> Result<()> {
        if data.ncols() == self.n_features_in() {
            Ok(())
        } else {
            Err(TransformError::FeatureMismatch {
                expected: self.n_features_in(),
                got: data.ncols(),
            })
        }
    }

    pub fn transform(&self, data: &Array2<f64>) -> Result<Array2<f64>> {
        self.check_width(data)?;
        let mut scaled = data.to_owned();
        if self.config.with_mean {
            scaled -= &Array1::from(self.mean.clone());
        }
        if self.config.with_std {
            scaled /= &Array1::from(self.scale.clone());
        }
        Ok(scaled)
    }

    pub fn inverse_transform(&self, data: &Array2<f64>) -> Result<Array2<f64>> {
        self.check_width(data)?;
        let mut restored = data.to_owned();
        if self.config.with_std {
            restored *= &Array1::from(self.scale.clone());
        }
        if self.config.with_mean {
            restored += &Array1::from(self.mean.clone());
        }
        Ok(restored)
    }
}

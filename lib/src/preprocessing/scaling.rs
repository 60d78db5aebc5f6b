//! Standard scaler (z-score normalization).
//!
//! Transforms features by removing the mean and scaling to unit variance:
//! `z = (x - u) / s`, where `u` and `s` are the per-feature mean and
//! standard deviation learned from the training matrix. The same fitted
//! statistics are applied at training and at inference, so a fitted scaler
//! is part of the persisted artifact bundle.

use crate::preprocessing::error::PreprocessingError;
use serde::{Deserialize, Serialize};

/// Serializable parameters for a fitted [`StandardScaler`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StandardScalerParams {
    /// Mean of each feature.
    pub mean: Vec<f64>,
    /// Standard deviation of each feature (1.0 for constant features).
    pub std: Vec<f64>,
    /// Number of features seen during fit.
    pub n_features: usize,
}

/// StandardScaler transformer (unfitted).
#[derive(Clone, Debug, Default)]
pub struct StandardScaler;

impl StandardScaler {
    /// Fit the scaler on a feature matrix of shape `(n_samples, n_features)`.
    ///
    /// Uses the population standard deviation (ddof = 0). Constant features
    /// store a standard deviation of 1.0 so that `transform` stays total:
    /// an in-range constant value scales to exactly 0.
    ///
    /// # Errors
    /// Returns [`PreprocessingError::EmptyData`] if `data` has no rows, and
    /// [`PreprocessingError::FeatureMismatch`] if rows are ragged.
    pub fn fit(data: &[Vec<f64>]) -> Result<FittedStandardScaler, PreprocessingError> {
        let rows = data.len();
        if rows == 0 {
            return Err(PreprocessingError::EmptyData(
                "Cannot fit StandardScaler on empty data".to_string(),
            ));
        }

        let cols = data[0].len();
        for row in data {
            if row.len() != cols {
                return Err(PreprocessingError::FeatureMismatch {
                    expected_features: cols,
                    got_features: row.len(),
                });
            }
        }

        let mut mean = vec![0.0; cols];
        for row in data {
            for (m, &v) in mean.iter_mut().zip(row.iter()) {
                *m += v;
            }
        }
        for m in mean.iter_mut() {
            *m /= rows as f64;
        }

        let mut std = vec![0.0; cols];
        for row in data {
            for (s, (&v, &m)) in std.iter_mut().zip(row.iter().zip(mean.iter())) {
                let diff = v - m;
                *s += diff * diff;
            }
        }
        for s in std.iter_mut() {
            *s = (*s / rows as f64).sqrt();
            // Constant features would otherwise divide by zero
            if *s == 0.0 {
                *s = 1.0;
            }
        }

        Ok(FittedStandardScaler {
            mean,
            std,
            n_features: cols,
        })
    }
}

/// Fitted StandardScaler ready for inference.
#[derive(Clone, Debug, PartialEq)]
pub struct FittedStandardScaler {
    mean: Vec<f64>,
    std: Vec<f64>,
    n_features: usize,
}

impl FittedStandardScaler {
    /// Get the mean values for each feature.
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    /// Get the standard deviation values for each feature.
    pub fn std(&self) -> &[f64] {
        &self.std
    }

    /// Returns the number of features seen during fit.
    pub fn n_features_in(&self) -> usize {
        self.n_features
    }

    /// Standardize a single feature vector.
    ///
    /// # Errors
    /// Returns [`PreprocessingError::FeatureMismatch`] if `row` does not
    /// have the fitted number of features.
    pub fn transform_row(&self, row: &[f64]) -> Result<Vec<f64>, PreprocessingError> {
        if row.len() != self.n_features {
            return Err(PreprocessingError::FeatureMismatch {
                expected_features: self.n_features,
                got_features: row.len(),
            });
        }

        Ok(row
            .iter()
            .zip(self.mean.iter().zip(self.std.iter()))
            .map(|(&v, (&m, &s))| (v - m) / s)
            .collect())
    }

    /// Standardize a feature matrix row by row.
    pub fn transform(&self, data: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, PreprocessingError> {
        data.iter().map(|row| self.transform_row(row)).collect()
    }

    /// Extract learned parameters as a serializable representation.
    pub fn extract_params(&self) -> StandardScalerParams {
        StandardScalerParams {
            mean: self.mean.clone(),
            std: self.std.clone(),
            n_features: self.n_features,
        }
    }

    /// Reconstruct a fitted scaler from parameters.
    pub fn from_params(params: StandardScalerParams) -> Result<Self, PreprocessingError> {
        if params.mean.len() != params.n_features || params.std.len() != params.n_features {
            return Err(PreprocessingError::FeatureMismatch {
                expected_features: params.n_features,
                got_features: params.mean.len().min(params.std.len()),
            });
        }

        Ok(Self {
            mean: params.mean,
            std: params.std,
            n_features: params.n_features,
        })
    }
}

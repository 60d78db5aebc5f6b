//! Metrics for evaluating the price regressor.

use serde::{Deserialize, Serialize};

/// Metrics for evaluating regression models.
pub struct Metrics;

impl Metrics {
    /// Mean Squared Error: `mean((y_true - y_pred)^2)`.
    pub fn mse(y_true: &[f64], y_pred: &[f64]) -> f64 {
        assert_eq!(
            y_true.len(),
            y_pred.len(),
            "Arrays must have the same length"
        );

        if y_true.is_empty() {
            return 0.0;
        }

        let sum_sq: f64 = y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(&t, &p)| (t - p).powi(2))
            .sum();

        sum_sq / y_true.len() as f64
    }

    /// Root Mean Squared Error, in the same units as the target.
    pub fn rmse(y_true: &[f64], y_pred: &[f64]) -> f64 {
        Self::mse(y_true, y_pred).sqrt()
    }

    /// Mean Absolute Error: `mean(|y_true - y_pred|)`.
    pub fn mae(y_true: &[f64], y_pred: &[f64]) -> f64 {
        assert_eq!(
            y_true.len(),
            y_pred.len(),
            "Arrays must have the same length"
        );

        if y_true.is_empty() {
            return 0.0;
        }

        let sum_abs: f64 = y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(&t, &p)| (t - p).abs())
            .sum();

        sum_abs / y_true.len() as f64
    }

    /// R² (coefficient of determination): `1 - SS_res / SS_tot`.
    ///
    /// Can be negative when the model is worse than predicting the mean.
    pub fn r_squared(y_true: &[f64], y_pred: &[f64]) -> f64 {
        assert_eq!(
            y_true.len(),
            y_pred.len(),
            "Arrays must have the same length"
        );

        if y_true.is_empty() {
            return 0.0;
        }

        let mean_true: f64 = y_true.iter().copied().sum::<f64>() / y_true.len() as f64;

        let ss_res: f64 = y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(&t, &p)| (t - p).powi(2))
            .sum();

        let ss_tot: f64 = y_true.iter().map(|&t| (t - mean_true).powi(2)).sum();

        if ss_tot == 0.0 {
            return if ss_res == 0.0 { 1.0 } else { 0.0 };
        }

        1.0 - (ss_res / ss_tot)
    }

    /// Mean Absolute Percentage Error, as a percentage.
    ///
    /// Zero-valued targets are skipped so the metric stays total.
    pub fn mape(y_true: &[f64], y_pred: &[f64]) -> f64 {
        assert_eq!(
            y_true.len(),
            y_pred.len(),
            "Arrays must have the same length"
        );

        let mut sum = 0.0;
        let mut count = 0usize;
        for (&t, &p) in y_true.iter().zip(y_pred.iter()) {
            if t != 0.0 {
                sum += ((t - p) / t).abs();
                count += 1;
            }
        }

        if count == 0 {
            return 0.0;
        }

        sum / count as f64 * 100.0
    }

    /// Calculate all regression metrics at once.
    pub fn calculate_all(y_true: &[f64], y_pred: &[f64]) -> RegressionMetrics {
        RegressionMetrics {
            mse: Self::mse(y_true, y_pred),
            rmse: Self::rmse(y_true, y_pred),
            mae: Self::mae(y_true, y_pred),
            r_squared: Self::r_squared(y_true, y_pred),
            mape: Self::mape(y_true, y_pred),
        }
    }
}

/// All regression metrics for one evaluation pass.
#[derive(Debug, Clone, Copy)]
pub struct RegressionMetrics {
    pub mse: f64,
    pub rmse: f64,
    pub mae: f64,
    pub r_squared: f64,
    pub mape: f64,
}

/// The metrics document persisted with a trained artifact bundle.
///
/// Descriptive only: serving reads it for the health and prediction
/// responses but never recomputes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub r2_score: f64,
    pub mae: f64,
    pub rmse: f64,
    pub mape: f64,
    /// RFC 3339 timestamp of the training run.
    pub trained_at: String,
    pub model_type: String,
    pub feature_count: usize,
}

impl TrainingReport {
    /// Assemble the report from an evaluation pass.
    pub fn new(
        metrics: &RegressionMetrics,
        trained_at: String,
        model_type: String,
        feature_count: usize,
    ) -> Self {
        Self {
            r2_score: metrics.r_squared,
            mae: metrics.mae,
            rmse: metrics.rmse,
            mape: metrics.mape,
            trained_at,
            model_type,
            feature_count,
        }
    }
}

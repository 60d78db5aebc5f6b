//! Random forest wrapper.
//!
//! Thin adapter around smartcore's `RandomForestRegressor` with a fixed,
//! reproducible parameter set. Hyper-parameter search is deliberately not
//! part of this crate; the forest is treated as an opaque fit/predict
//! capability keyed to the canonical feature order.

use crate::metrics::{Metrics, RegressionMetrics};
use crate::model::{ModelError, Regressor};
use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use tracing::info;

type Forest = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// Forest hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    /// Number of trees in the ensemble.
    pub n_trees: usize,
    /// Maximum depth of each tree.
    pub max_depth: u16,
    /// Minimum samples required to split a node.
    pub min_samples_split: usize,
    /// Minimum samples required in a leaf node.
    pub min_samples_leaf: usize,
    /// Seed for the bootstrap sampling, fixed for reproducible runs.
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 200,
            max_depth: 16,
            min_samples_split: 2,
            min_samples_leaf: 1,
            seed: 42,
        }
    }
}

/// Random forest regressor wrapper.
#[derive(Debug, Serialize, Deserialize)]
pub struct ForestRegressor {
    params: ForestParams,
    model: Option<Forest>,
}

impl ForestRegressor {
    /// Create an untrained regressor with default parameters.
    pub fn new() -> Self {
        Self::with_params(ForestParams::default())
    }

    /// Create an untrained regressor with custom parameters.
    pub fn with_params(params: ForestParams) -> Self {
        Self {
            params,
            model: None,
        }
    }

    /// Train the forest on a row-major feature matrix.
    pub fn fit(&mut self, features: &[Vec<f64>], targets: &[f64]) -> Result<(), ModelError> {
        if features.is_empty() {
            return Err(ModelError::InvalidData("Empty dataset".to_string()));
        }
        if features.len() != targets.len() {
            return Err(ModelError::InvalidData(format!(
                "{} feature rows but {} targets",
                features.len(),
                targets.len()
            )));
        }

        info!(
            samples = features.len(),
            features = features[0].len(),
            n_trees = self.params.n_trees,
            "training random forest regressor"
        );

        let x = DenseMatrix::from_2d_vec(&features.to_vec()).map_err(|e| {
            ModelError::InvalidData(format!("Failed to create feature matrix: {}", e))
        })?;
        let y = targets.to_vec();

        let model = Forest::fit(
            &x,
            &y,
            RandomForestRegressorParameters::default()
                .with_n_trees(self.params.n_trees)
                .with_max_depth(self.params.max_depth)
                .with_min_samples_split(self.params.min_samples_split)
                .with_min_samples_leaf(self.params.min_samples_leaf)
                .with_seed(self.params.seed),
        )
        .map_err(|e| ModelError::TrainingFailed(e.to_string()))?;

        self.model = Some(model);
        info!("forest training completed");

        Ok(())
    }

    /// Evaluate against held-out targets.
    pub fn evaluate(
        &self,
        features: &[Vec<f64>],
        targets: &[f64],
    ) -> Result<RegressionMetrics, ModelError> {
        let predictions = Regressor::predict(self, features)?;
        Ok(Metrics::calculate_all(targets, &predictions))
    }

    /// Get the forest hyperparameters.
    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    /// Check whether fit has completed.
    pub fn is_trained(&self) -> bool {
        self.model.is_some()
    }
}

impl Default for ForestRegressor {
    fn default() -> Self {
        Self::new()
    }
}

impl Regressor for ForestRegressor {
    fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<f64>, ModelError> {
        let model = self.model.as_ref().ok_or(ModelError::NotTrained)?;

        let x = DenseMatrix::from_2d_vec(&features.to_vec()).map_err(|e| {
            ModelError::PredictionFailed(format!("Failed to create feature matrix: {}", e))
        })?;

        model
            .predict(&x)
            .map_err(|e| ModelError::PredictionFailed(e.to_string()))
    }
}

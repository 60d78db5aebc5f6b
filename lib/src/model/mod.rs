//! The regression model behind the price estimate.
//!
//! The learning algorithm itself is an off-the-shelf ensemble regressor;
//! this module wraps it behind [`Regressor`], the seam the prediction
//! pipeline depends on. Anything that can score a feature matrix can stand
//! in for the forest, which is how the serving path is tested without a
//! trained model.

pub mod forest;

pub use forest::{ForestParams, ForestRegressor};

use std::fmt;

/// Errors from model training or prediction.
#[derive(Debug)]
pub enum ModelError {
    /// Training failed inside the underlying learner.
    TrainingFailed(String),
    /// Prediction failed inside the underlying learner.
    PredictionFailed(String),
    /// Input data unusable for the requested operation.
    InvalidData(String),
    /// Predict called before fit.
    NotTrained,
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::TrainingFailed(msg) => write!(f, "Training failed: {}", msg),
            ModelError::PredictionFailed(msg) => write!(f, "Prediction failed: {}", msg),
            ModelError::InvalidData(msg) => write!(f, "Invalid data: {}", msg),
            ModelError::NotTrained => write!(f, "Model not trained"),
        }
    }
}

impl std::error::Error for ModelError {}

/// An opaque fitted regression capability.
///
/// `features` is a row-major matrix whose column order must exactly match
/// the order the model was fitted on; the caller (the aligner) guarantees
/// that.
pub trait Regressor: Send + Sync {
    /// Score each feature row, returning one prediction per row.
    fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<f64>, ModelError>;
}

//! The state-free prediction pipeline.
//!
//! `predict(raw)` is engineer → align → scale → model, with the result
//! floored at zero. Every stage reads only immutable fitted state, so one
//! pipeline value serves concurrent requests without locking; hot-swapping
//! a retrained bundle is done by replacing the shared handle, never by
//! mutating a loaded pipeline in place.

use crate::artifacts::ArtifactBundle;
use crate::features::{FeatureAligner, FeatureEngineer};
use crate::metrics::TrainingReport;
use crate::model::{ModelError, Regressor};
use crate::preprocessing::{FittedStandardScaler, PreprocessingError};
use crate::schema::RawRecord;
use std::fmt;

/// Internal failure while computing a prediction.
///
/// Surfaced to clients as a generic server error; the detail is only for
/// server-side logs.
#[derive(Debug)]
pub enum PipelineError {
    Preprocessing(PreprocessingError),
    Model(ModelError),
    /// The model returned no value for the single input row.
    EmptyPrediction,
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Preprocessing(err) => write!(f, "Preprocessing error: {}", err),
            PipelineError::Model(err) => write!(f, "Model error: {}", err),
            PipelineError::EmptyPrediction => write!(f, "Model returned no prediction"),
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<PreprocessingError> for PipelineError {
    fn from(err: PreprocessingError) -> Self {
        PipelineError::Preprocessing(err)
    }
}

impl From<ModelError> for PipelineError {
    fn from(err: ModelError) -> Self {
        PipelineError::Model(err)
    }
}

/// A loaded, immutable prediction pipeline.
pub struct PricePipeline {
    engineer: FeatureEngineer,
    feature_names: Vec<String>,
    scaler: FittedStandardScaler,
    model: Box<dyn Regressor>,
    report: TrainingReport,
    model_type: String,
}

impl PricePipeline {
    /// Assemble a pipeline from its parts. The model seam takes any
    /// [`Regressor`], which is how tests drive the full path without a
    /// trained forest.
    pub fn new(
        engineer: FeatureEngineer,
        feature_names: Vec<String>,
        scaler: FittedStandardScaler,
        model: Box<dyn Regressor>,
        report: TrainingReport,
        model_type: String,
    ) -> Self {
        Self {
            engineer,
            feature_names,
            scaler,
            model,
            report,
            model_type,
        }
    }

    /// Build the serving pipeline from a loaded artifact bundle.
    pub fn from_bundle(bundle: ArtifactBundle) -> Self {
        let engineer =
            FeatureEngineer::new(bundle.metadata.reference_year, bundle.metadata.bins);
        Self {
            engineer,
            feature_names: bundle.metadata.feature_names,
            scaler: bundle.scaler,
            model: Box::new(bundle.forest),
            report: bundle.report,
            model_type: bundle.metadata.model_type,
        }
    }

    /// The canonical ordered feature names.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// The persisted training metrics.
    pub fn report(&self) -> &TrainingReport {
        &self.report
    }

    /// Human-readable model type.
    pub fn model_type(&self) -> &str {
        &self.model_type
    }

    /// Estimate the price for one validated record.
    ///
    /// Deterministic for a fixed record and fitted state. Negative raw
    /// model outputs are floored to zero before being returned; prices
    /// below zero are a business impossibility, not a transform error.
    pub fn predict(&self, record: &RawRecord) -> Result<f64, PipelineError> {
        let engineered = self.engineer.transform(record);
        let aligned = FeatureAligner::align(&engineered, &self.feature_names);
        let scaled = self.scaler.transform_row(&aligned)?;

        let predictions = self.model.predict(std::slice::from_ref(&scaled))?;
        let price = predictions
            .first()
            .copied()
            .ok_or(PipelineError::EmptyPrediction)?;

        Ok(price.max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{canonical_feature_names, BinEdges, CategoryBins};
    use crate::preprocessing::StandardScalerParams;

    /// A regressor that always returns the same value.
    struct FixedRegressor(f64);

    impl Regressor for FixedRegressor {
        fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<f64>, ModelError> {
            Ok(vec![self.0; features.len()])
        }
    }

    /// A regressor that checks the arity of every row it is given.
    struct ArityCheckingRegressor {
        expected: usize,
    }

    impl Regressor for ArityCheckingRegressor {
        fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<f64>, ModelError> {
            for row in features {
                if row.len() != self.expected {
                    return Err(ModelError::InvalidData(format!(
                        "expected {} columns, got {}",
                        self.expected,
                        row.len()
                    )));
                }
            }
            Ok(vec![1.0; features.len()])
        }
    }

    struct FailingRegressor;

    impl Regressor for FailingRegressor {
        fn predict(&self, _features: &[Vec<f64>]) -> Result<Vec<f64>, ModelError> {
            Err(ModelError::PredictionFailed("boom".to_string()))
        }
    }

    fn test_report(feature_count: usize) -> TrainingReport {
        TrainingReport {
            r2_score: 0.9,
            mae: 100.0,
            rmse: 150.0,
            mape: 12.0,
            trained_at: "2024-06-01T12:00:00+00:00".to_string(),
            model_type: "RandomForestRegressor".to_string(),
            feature_count,
        }
    }

    fn identity_scaler(n: usize) -> FittedStandardScaler {
        FittedStandardScaler::from_params(StandardScalerParams {
            mean: vec![0.0; n],
            std: vec![1.0; n],
            n_features: n,
        })
        .unwrap()
    }

    fn test_pipeline(model: Box<dyn Regressor>) -> PricePipeline {
        let names = canonical_feature_names();
        let n = names.len();
        let engineer = FeatureEngineer::new(
            2024,
            CategoryBins {
                condition: BinEdges { min: 1.0, max: 10.0 },
                grade: BinEdges { min: 1.0, max: 13.0 },
                views: BinEdges { min: 0.0, max: 4.0 },
            },
        );
        PricePipeline::new(
            engineer,
            names,
            identity_scaler(n),
            model,
            test_report(n),
            "RandomForestRegressor".to_string(),
        )
    }

    fn sample_record() -> RawRecord {
        RawRecord {
            bedrooms: 3.0,
            bathrooms: 2.0,
            living_area: 1800.0,
            lot_area: 5000.0,
            floors: 1.0,
            waterfront: 0.0,
            views: 0.0,
            condition: 3.0,
            grade: 7.0,
            house_area: 1800.0,
            basement_area: 0.0,
            built_year: 1990.0,
            renovation_year: 0.0,
            latitude: 47.5,
            longitude: -122.2,
            living_area_renovated: 1800.0,
            lot_area_renovated: 5000.0,
            schools_nearby: 2.0,
            airport_distance: 15.0,
        }
    }

    #[test]
    fn test_negative_prediction_floored_to_zero() {
        let pipeline = test_pipeline(Box::new(FixedRegressor(-500.0)));
        let price = pipeline.predict(&sample_record()).unwrap();
        assert_eq!(price, 0.0);
    }

    #[test]
    fn test_positive_prediction_passes_through() {
        let pipeline = test_pipeline(Box::new(FixedRegressor(425_000.0)));
        let price = pipeline.predict(&sample_record()).unwrap();
        assert_eq!(price, 425_000.0);
    }

    #[test]
    fn test_model_sees_canonical_arity() {
        let n = canonical_feature_names().len();
        let pipeline = test_pipeline(Box::new(ArityCheckingRegressor { expected: n }));
        assert!(pipeline.predict(&sample_record()).is_ok());
    }

    #[test]
    fn test_predict_is_deterministic() {
        let pipeline = test_pipeline(Box::new(FixedRegressor(1234.5)));
        let record = sample_record();

        let first = pipeline.predict(&record).unwrap();
        for _ in 0..5 {
            assert_eq!(pipeline.predict(&record).unwrap(), first);
        }
    }

    #[test]
    fn test_model_failure_propagates() {
        let pipeline = test_pipeline(Box::new(FailingRegressor));
        assert!(matches!(
            pipeline.predict(&sample_record()),
            Err(PipelineError::Model(_))
        ));
    }

    #[test]
    fn test_empty_prediction_is_an_error() {
        struct SilentRegressor;
        impl Regressor for SilentRegressor {
            fn predict(&self, _features: &[Vec<f64>]) -> Result<Vec<f64>, ModelError> {
                Ok(Vec::new())
            }
        }

        let pipeline = test_pipeline(Box::new(SilentRegressor));
        assert!(matches!(
            pipeline.predict(&sample_record()),
            Err(PipelineError::EmptyPrediction)
        ));
    }

    #[test]
    fn test_scaler_arity_mismatch_is_an_error() {
        // A pipeline wired with a scaler fitted on the wrong width fails
        // loudly instead of feeding the model misaligned columns
        let names = canonical_feature_names();
        let engineer = FeatureEngineer::new(
            2024,
            CategoryBins {
                condition: BinEdges { min: 1.0, max: 10.0 },
                grade: BinEdges { min: 1.0, max: 13.0 },
                views: BinEdges { min: 0.0, max: 4.0 },
            },
        );
        let pipeline = PricePipeline::new(
            engineer,
            names,
            identity_scaler(3),
            Box::new(FixedRegressor(1.0)),
            test_report(3),
            "RandomForestRegressor".to_string(),
        );

        assert!(matches!(
            pipeline.predict(&sample_record()),
            Err(PipelineError::Preprocessing(
                PreprocessingError::FeatureMismatch { .. }
            ))
        ));
    }
}

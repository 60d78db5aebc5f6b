//! # homeprice
//!
//! House market-price estimation from structured attributes, split into an
//! offline training pipeline and the fitted state an online service needs
//! to answer prediction requests.
//!
//! The part that matters is not the regressor (an off-the-shelf ensemble
//! behind the [`model::Regressor`] seam) but the deterministic path from
//! raw attributes to the exact numeric vector the model was trained on.
//! Any train/serve divergence in that path produces silently wrong prices
//! rather than an error, so everything the transformation depends on
//! (reference year, categorical bin edges, canonical column order, scaler
//! statistics) is fitted once during training and persisted in a single
//! artifact bundle that serving replays verbatim.
//!
//! ## Module Structure
//!
//! - **`schema`**: fixed raw input schema and validation
//! - **`features`**: feature engineering, bucketization, alignment
//! - **`preprocessing`**: standard scaler with persistable fitted state
//! - **`model`**: the opaque regressor seam and the random forest wrapper
//! - **`metrics`**: regression metrics and the persisted training report
//! - **`dataset`**: historical CSV loading and the reproducible split
//! - **`artifacts`**: the atomic four-asset bundle
//! - **`pipeline`**: the state-free request path from raw record to
//!   clamped price
//!
//! Training lives in `src/bin/train.rs`; the HTTP surface lives in the
//! `homeprice-server` crate.

pub mod artifacts;
pub mod dataset;
pub mod features;
pub mod metrics;
pub mod model;
pub mod pipeline;
pub mod preprocessing;
pub mod schema;

pub use artifacts::{ArtifactBundle, ArtifactError, BundleMetadata};
pub use dataset::{HousingDataset, TrainingDataError};
pub use features::{canonical_feature_names, FeatureAligner, FeatureEngineer};
pub use metrics::{Metrics, TrainingReport};
pub use model::{ForestParams, ForestRegressor, ModelError, Regressor};
pub use pipeline::{PipelineError, PricePipeline};
pub use preprocessing::{FittedStandardScaler, PreprocessingError, StandardScaler};
pub use schema::{RawRecord, ValidationError};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{BinEdges, CategoryBins};

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

    // End-to-end determinism of the full transform chain: for a fixed
    // record, reference year and fitted state, engineer -> align -> scale
    // yields an identical vector on every call.
    #[test]
    fn test_transform_chain_is_deterministic() {
        let engineer = FeatureEngineer::new(
            2024,
            CategoryBins {
                condition: BinEdges { min: 1.0, max: 10.0 },
                grade: BinEdges { min: 1.0, max: 13.0 },
                views: BinEdges { min: 0.0, max: 4.0 },
            },
        );
        let names = canonical_feature_names();

        let record = sample_record();
        let rows: Vec<Vec<f64>> = [2.0, 3.0, 4.0]
            .iter()
            .map(|&b| {
                let r = RawRecord {
                    bedrooms: b,
                    ..record.clone()
                };
                FeatureAligner::align(&engineer.transform(&r), &names)
            })
            .collect();
        let scaler = StandardScaler::fit(&rows).unwrap();

        let reference = scaler
            .transform_row(&FeatureAligner::align(&engineer.transform(&record), &names))
            .unwrap();
        for _ in 0..10 {
            let again = scaler
                .transform_row(&FeatureAligner::align(&engineer.transform(&record), &names))
                .unwrap();
            assert_eq!(reference, again);
        }
    }

    // The full offline-to-online cycle: fit everything on synthetic
    // sales, persist the bundle, load it back and serve a prediction.
    #[test]
    fn test_train_save_load_predict_round_trip() {
        let mut records = Vec::new();
        let mut prices = Vec::new();
        for i in 0..40 {
            records.push(RawRecord {
                bedrooms: (i % 5 + 1) as f64,
                living_area: 1000.0 + 50.0 * i as f64,
                condition: 1.0 + (i % 9) as f64,
                grade: 1.0 + (i % 12) as f64,
                views: (i % 5) as f64,
                built_year: 1950.0 + i as f64,
                ..sample_record()
            });
            prices.push(100_000.0 + 10_000.0 * i as f64);
        }

        let engineer = FeatureEngineer::fit(2024, &records).unwrap();
        let names = canonical_feature_names();
        let matrix: Vec<Vec<f64>> = records
            .iter()
            .map(|r| FeatureAligner::align(&engineer.transform(r), &names))
            .collect();
        let scaler = StandardScaler::fit(&matrix).unwrap();
        let scaled = scaler.transform(&matrix).unwrap();

        let mut forest = ForestRegressor::with_params(ForestParams {
            n_trees: 15,
            max_depth: 8,
            ..ForestParams::default()
        });
        forest.fit(&scaled, &prices).unwrap();
        let metrics = forest.evaluate(&scaled, &prices).unwrap();

        let bundle = ArtifactBundle {
            forest,
            scaler,
            metadata: BundleMetadata {
                feature_names: names.clone(),
                model_type: "RandomForestRegressor".to_string(),
                reference_year: 2024,
                bins: *engineer.bins(),
            },
            report: TrainingReport::new(
                &metrics,
                "2024-06-01T12:00:00+00:00".to_string(),
                "RandomForestRegressor".to_string(),
                names.len(),
            ),
        };

        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("artifacts");
        bundle.save(&dir).unwrap();

        let pipeline = PricePipeline::from_bundle(ArtifactBundle::load(&dir).unwrap());
        let price = pipeline.predict(&sample_record()).unwrap();
        assert!(price.is_finite());
        assert!(price >= 0.0);
    }

    // Alignment completeness across wildly different records: output
    // length always equals the canonical list length.
    #[test]
    fn test_alignment_completeness() {
        let engineer = FeatureEngineer::new(
            2024,
            CategoryBins {
                condition: BinEdges { min: 1.0, max: 10.0 },
                grade: BinEdges { min: 1.0, max: 13.0 },
                views: BinEdges { min: 0.0, max: 4.0 },
            },
        );
        let names = canonical_feature_names();

        for (condition, grade, views) in [(1.0, 1.0, 0.0), (5.0, 7.0, 2.0), (10.0, 13.0, 4.0)] {
            let record = RawRecord {
                condition,
                grade,
                views,
                ..sample_record()
            };
            let aligned = FeatureAligner::align(&engineer.transform(&record), &names);
            assert_eq!(aligned.len(), names.len());
        }
    }
}

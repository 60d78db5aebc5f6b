//! Training entry point.
//!
//! Usage: `train [dataset.csv] [artifacts-dir]`
//!
//! Loads the historical sales CSV, fits the feature engineer (freezing the
//! categorical bin edges), fits the scaler on the full engineered matrix,
//! trains the forest on a reproducible 80/20 split, evaluates on the
//! held-out partition and persists the four-asset artifact bundle the
//! server loads at startup.

use chrono::{Datelike, Utc};
use homeprice::artifacts::{ArtifactBundle, BundleMetadata};
use homeprice::dataset::{split_indices, HousingDataset};
use homeprice::features::{canonical_feature_names, FeatureAligner, FeatureEngineer};
use homeprice::metrics::TrainingReport;
use homeprice::model::ForestRegressor;
use homeprice::preprocessing::StandardScaler;
use std::env;
use std::error::Error;
use std::path::Path;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

const TRAIN_RATIO: f64 = 0.8;
const SPLIT_SEED: u64 = 42;
const MODEL_TYPE: &str = "RandomForestRegressor";

fn main() -> Result<(), Box<dyn Error>> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut args = env::args().skip(1);
    let data_path = args.next().unwrap_or_else(|| "data/housing.csv".to_string());
    let artifacts_dir = args.next().unwrap_or_else(|| "artifacts".to_string());

    println!("House Price Model Training");
    println!("{}", "=".repeat(40));
    println!("Dataset: {}", data_path);

    let dataset = HousingDataset::load(&data_path)?;

    let mean_price: f64 = dataset.prices.iter().sum::<f64>() / dataset.len() as f64;
    let min_price = dataset.prices.iter().cloned().fold(f64::INFINITY, f64::min);
    let max_price = dataset
        .prices
        .iter()
        .cloned()
        .fold(f64::NEG_INFINITY, f64::max);
    println!("Samples: {}", dataset.len());
    println!("Mean price: ${:.2}", mean_price);
    println!("Price range: ${:.2} - ${:.2}", min_price, max_price);

    // The reference year is captured once here and persisted with the
    // bundle; serving reuses it instead of reading its own clock.
    let reference_year = Utc::now().year();
    info!(reference_year, "fitting feature engineer");

    let engineer = FeatureEngineer::fit(reference_year, &dataset.records)?;
    let feature_names = canonical_feature_names();

    let engineered = engineer.transform_batch(&dataset.records);
    let matrix: Vec<Vec<f64>> = engineered
        .iter()
        .map(|record| FeatureAligner::align(record, &feature_names))
        .collect();
    println!("Feature matrix: {} x {}", matrix.len(), feature_names.len());

    // Scaler statistics come from the full engineered matrix; the split
    // below only decides what the forest trains and evaluates on.
    let scaler = StandardScaler::fit(&matrix)?;
    let scaled = scaler.transform(&matrix)?;

    let (train_idx, test_idx) = split_indices(dataset.len(), TRAIN_RATIO, SPLIT_SEED);
    let x_train = gather_rows(&scaled, &train_idx);
    let y_train = gather_values(&dataset.prices, &train_idx);
    let x_test = gather_rows(&scaled, &test_idx);
    let y_test = gather_values(&dataset.prices, &test_idx);
    println!("Training set size: {}", x_train.len());
    println!("Test set size: {}", x_test.len());

    let mut forest = ForestRegressor::new();
    forest.fit(&x_train, &y_train)?;

    let metrics = forest.evaluate(&x_test, &y_test)?;
    println!();
    println!("Model Performance:");
    println!("  R2 Score: {:.4}", metrics.r_squared);
    println!("  MAE:  ${:.2}", metrics.mae);
    println!("  RMSE: ${:.2}", metrics.rmse);
    println!("  MAPE: {:.2}%", metrics.mape);

    let report = TrainingReport::new(
        &metrics,
        Utc::now().to_rfc3339(),
        MODEL_TYPE.to_string(),
        feature_names.len(),
    );
    let bundle = ArtifactBundle {
        forest,
        scaler,
        metadata: BundleMetadata {
            feature_names,
            model_type: MODEL_TYPE.to_string(),
            reference_year,
            bins: *engineer.bins(),
        },
        report,
    };
    bundle.save(Path::new(&artifacts_dir))?;

    println!();
    println!("Artifacts saved to {}/", artifacts_dir);
    Ok(())
}

fn gather_rows(rows: &[Vec<f64>], indices: &[usize]) -> Vec<Vec<f64>> {
    indices.iter().map(|&i| rows[i].clone()).collect()
}

fn gather_values(values: &[f64], indices: &[usize]) -> Vec<f64> {
    indices.iter().map(|&i| values[i]).collect()
}

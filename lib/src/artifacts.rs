//! Persisted artifact bundle.
//!
//! One training run produces four assets that only make sense together:
//! the fitted forest, the fitted scaler, the bundle metadata (canonical
//! feature names, model type, reference year, categorical bin edges) and
//! the metrics document. They are written into a temporary directory and
//! renamed into place, so a crashed run can never leave a bundle whose
//! model and feature list disagree. Loading re-checks the cross-asset
//! invariants and fails hard on any mismatch.

use crate::features::CategoryBins;
use crate::metrics::TrainingReport;
use crate::model::ForestRegressor;
use crate::preprocessing::{FittedStandardScaler, StandardScalerParams};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Serialized forest asset.
pub const FOREST_FILE: &str = "forest.bin";
/// Serialized scaler parameters asset.
pub const SCALER_FILE: &str = "scaler.bin";
/// Serialized bundle metadata asset.
pub const METADATA_FILE: &str = "metadata.bin";
/// Metrics document asset.
pub const METRICS_FILE: &str = "metrics.json";

/// Artifact bundle failure: missing, corrupt or mutually inconsistent
/// assets. Fatal at service startup.
#[derive(Debug)]
pub enum ArtifactError {
    /// Asset file unreadable or bundle directory not writable.
    Io(String),
    /// Asset present but failed to parse.
    Corrupt { asset: String, detail: String },
    /// Assets parsed individually but disagree with each other.
    Inconsistent(String),
}

impl fmt::Display for ArtifactError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactError::Io(msg) => write!(f, "Artifact I/O error: {}", msg),
            ArtifactError::Corrupt { asset, detail } => {
                write!(f, "Artifact '{}' is corrupt: {}", asset, detail)
            }
            ArtifactError::Inconsistent(msg) => {
                write!(f, "Artifact bundle is inconsistent: {}", msg)
            }
        }
    }
}

impl std::error::Error for ArtifactError {}

/// Training-time state the serving path must replay exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleMetadata {
    /// Canonical ordered feature names; the model's column order.
    pub feature_names: Vec<String>,
    /// Human-readable model type string.
    pub model_type: String,
    /// Year used for age arithmetic during training.
    pub reference_year: i32,
    /// Frozen categorical bin edges.
    pub bins: CategoryBins,
}

/// The four persisted artifacts of one training run.
#[derive(Debug)]
pub struct ArtifactBundle {
    pub forest: ForestRegressor,
    pub scaler: FittedStandardScaler,
    pub metadata: BundleMetadata,
    pub report: TrainingReport,
}

impl ArtifactBundle {
    /// Persist the bundle atomically into `dir`.
    ///
    /// All four assets are written to a temporary sibling directory first
    /// and moved into place with a single rename; an existing bundle is
    /// replaced wholesale, never file by file.
    pub fn save(&self, dir: &Path) -> Result<(), ArtifactError> {
        let tmp = temp_sibling(dir);
        fs::create_dir_all(&tmp).map_err(|e| ArtifactError::Io(e.to_string()))?;

        let result = self.write_assets(&tmp).and_then(|()| {
            if dir.exists() {
                fs::remove_dir_all(dir).map_err(|e| ArtifactError::Io(e.to_string()))?;
            }
            fs::rename(&tmp, dir).map_err(|e| ArtifactError::Io(e.to_string()))
        });

        if result.is_err() {
            fs::remove_dir_all(&tmp).ok();
        } else {
            info!(dir = %dir.display(), "artifact bundle saved");
        }
        result
    }

    fn write_assets(&self, dir: &Path) -> Result<(), ArtifactError> {
        write_bincode(dir, FOREST_FILE, &self.forest)?;
        write_bincode(dir, SCALER_FILE, &self.scaler.extract_params())?;
        write_bincode(dir, METADATA_FILE, &self.metadata)?;

        let metrics = serde_json::to_string_pretty(&self.report).map_err(|e| {
            ArtifactError::Corrupt {
                asset: METRICS_FILE.to_string(),
                detail: e.to_string(),
            }
        })?;
        fs::write(dir.join(METRICS_FILE), metrics).map_err(|e| ArtifactError::Io(e.to_string()))
    }

    /// Load and cross-check a bundle.
    ///
    /// Every asset must parse and the statically checkable invariants must
    /// hold: the scaler arity and the report's feature count both equal
    /// the feature-name list length, and the forest is actually trained.
    pub fn load(dir: &Path) -> Result<Self, ArtifactError> {
        let forest: ForestRegressor = read_bincode(dir, FOREST_FILE)?;
        let scaler_params: StandardScalerParams = read_bincode(dir, SCALER_FILE)?;
        let metadata: BundleMetadata = read_bincode(dir, METADATA_FILE)?;

        let metrics_path = dir.join(METRICS_FILE);
        let metrics_text =
            fs::read_to_string(&metrics_path).map_err(|e| ArtifactError::Io(format!(
                "{}: {}",
                metrics_path.display(),
                e
            )))?;
        let report: TrainingReport =
            serde_json::from_str(&metrics_text).map_err(|e| ArtifactError::Corrupt {
                asset: METRICS_FILE.to_string(),
                detail: e.to_string(),
            })?;

        let scaler =
            FittedStandardScaler::from_params(scaler_params).map_err(|e| ArtifactError::Corrupt {
                asset: SCALER_FILE.to_string(),
                detail: e.to_string(),
            })?;

        let n_features = metadata.feature_names.len();
        if n_features == 0 {
            return Err(ArtifactError::Inconsistent(
                "feature-name list is empty".to_string(),
            ));
        }
        if scaler.n_features_in() != n_features {
            return Err(ArtifactError::Inconsistent(format!(
                "scaler expects {} features but the feature list has {}",
                scaler.n_features_in(),
                n_features
            )));
        }
        if report.feature_count != n_features {
            return Err(ArtifactError::Inconsistent(format!(
                "metrics document reports {} features but the feature list has {}",
                report.feature_count, n_features
            )));
        }
        if !forest.is_trained() {
            return Err(ArtifactError::Inconsistent(
                "persisted forest was never fitted".to_string(),
            ));
        }

        info!(
            features = n_features,
            model_type = %metadata.model_type,
            "artifact bundle loaded"
        );

        Ok(Self {
            forest,
            scaler,
            metadata,
            report,
        })
    }
}

fn temp_sibling(dir: &Path) -> PathBuf {
    let mut name = dir.as_os_str().to_os_string();
    name.push(format!(".tmp-{}", std::process::id()));
    PathBuf::from(name)
}

fn write_bincode<T: Serialize>(dir: &Path, asset: &str, value: &T) -> Result<(), ArtifactError> {
    let bytes = bincode::serialize(value).map_err(|e| ArtifactError::Corrupt {
        asset: asset.to_string(),
        detail: e.to_string(),
    })?;
    fs::write(dir.join(asset), bytes).map_err(|e| ArtifactError::Io(e.to_string()))
}

fn read_bincode<T: DeserializeOwned>(dir: &Path, asset: &str) -> Result<T, ArtifactError> {
    let path = dir.join(asset);
    let bytes =
        fs::read(&path).map_err(|e| ArtifactError::Io(format!("{}: {}", path.display(), e)))?;
    bincode::deserialize(&bytes).map_err(|e| ArtifactError::Corrupt {
        asset: asset.to_string(),
        detail: e.to_string(),
    })
}

//! Historical sales dataset loading.
//!
//! Loads the housing CSV, accepting either the canonical snake_case
//! headers or the original survey captions ("number of bedrooms",
//! "Built Year", ...). Rows with any missing or unparseable cell are
//! dropped, a documented lossy step; the dropped/kept counts are logged
//! and an all-dropped dataset is a hard error.

use crate::schema::{RawRecord, FIELDS};
use csv::ReaderBuilder;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{info, warn};

/// Name of the target column.
const PRICE_COLUMN: &str = "price";

/// Offline training-data failure.
#[derive(Debug)]
pub enum TrainingDataError {
    /// Dataset file unreadable.
    Io(String),
    /// A required column is absent from the header row.
    MissingColumn(String),
    /// No usable rows remain after dropping incomplete ones.
    Empty { dropped: usize },
}

impl fmt::Display for TrainingDataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrainingDataError::Io(msg) => write!(f, "Failed to read dataset: {}", msg),
            TrainingDataError::MissingColumn(name) => {
                write!(f, "Dataset is missing required column '{}'", name)
            }
            TrainingDataError::Empty { dropped } => {
                write!(
                    f,
                    "Dataset is empty after dropping {} incomplete rows",
                    dropped
                )
            }
        }
    }
}

impl std::error::Error for TrainingDataError {}

impl From<std::io::Error> for TrainingDataError {
    fn from(err: std::io::Error) -> Self {
        TrainingDataError::Io(err.to_string())
    }
}

impl From<csv::Error> for TrainingDataError {
    fn from(err: csv::Error) -> Self {
        TrainingDataError::Io(err.to_string())
    }
}

/// Map a CSV header to its canonical column name.
///
/// The original survey export uses free-form captions; both spellings are
/// accepted so the same loader works on raw and pre-cleaned files.
fn canonical_header(header: &str) -> Option<&'static str> {
    let canonical = match header.trim() {
        "bedrooms" | "number of bedrooms" => "bedrooms",
        "bathrooms" | "number of bathrooms" => "bathrooms",
        "living_area" | "living area" => "living_area",
        "lot_area" | "lot area" => "lot_area",
        "floors" | "number of floors" => "floors",
        "waterfront" | "waterfront present" => "waterfront",
        "views" | "number of views" => "views",
        "condition" | "condition of the house" => "condition",
        "grade" | "grade of the house" => "grade",
        "house_area" | "Area of the house(excluding basement)" => "house_area",
        "basement_area" | "Area of the basement" => "basement_area",
        "built_year" | "Built Year" => "built_year",
        "renovation_year" | "Renovation Year" => "renovation_year",
        "latitude" | "Lattitude" => "latitude",
        "longitude" | "Longitude" => "longitude",
        "living_area_renovated" | "living_area_renov" => "living_area_renovated",
        "lot_area_renovated" | "lot_area_renov" => "lot_area_renovated",
        "schools_nearby" | "Number of schools nearby" => "schools_nearby",
        "airport_distance" | "Distance from the airport" => "airport_distance",
        "price" | "Price" => PRICE_COLUMN,
        _ => return None,
    };
    Some(canonical)
}

/// Historical sales: validated-shape records plus the observed price.
#[derive(Debug, Clone)]
pub struct HousingDataset {
    pub records: Vec<RawRecord>,
    pub prices: Vec<f64>,
}

impl HousingDataset {
    /// Load the dataset from a CSV file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TrainingDataError> {
        let file = File::open(path.as_ref())?;
        let reader = BufReader::new(file);
        let mut rdr = ReaderBuilder::new().from_reader(reader);

        // Resolve each required column's position from the header row;
        // unknown columns are simply ignored.
        let headers = rdr.headers()?.clone();
        let mut positions: Vec<Option<usize>> = vec![None; FIELDS.len()];
        let mut price_position: Option<usize> = None;

        for (idx, header) in headers.iter().enumerate() {
            match canonical_header(header) {
                Some(name) if name == PRICE_COLUMN => price_position = Some(idx),
                Some(name) => {
                    if let Some(slot) = FIELDS.iter().position(|spec| spec.name == name) {
                        positions[slot] = Some(idx);
                    }
                }
                None => {}
            }
        }

        let mut column_indices = Vec::with_capacity(FIELDS.len());
        for (spec, position) in FIELDS.iter().zip(positions) {
            match position {
                Some(idx) => column_indices.push(idx),
                None => return Err(TrainingDataError::MissingColumn(spec.name.to_string())),
            }
        }
        let price_idx =
            price_position.ok_or_else(|| TrainingDataError::MissingColumn(PRICE_COLUMN.into()))?;

        let mut records = Vec::new();
        let mut prices = Vec::new();
        let mut dropped = 0usize;

        for result in rdr.records() {
            let row = result?;

            let mut values = [0.0f64; FIELDS.len()];
            let mut complete = true;
            for (slot, &idx) in values.iter_mut().zip(column_indices.iter()) {
                match row.get(idx).and_then(parse_cell) {
                    Some(v) => *slot = v,
                    None => {
                        complete = false;
                        break;
                    }
                }
            }
            let price = row.get(price_idx).and_then(parse_cell);

            match (complete, price) {
                (true, Some(price)) => {
                    records.push(RawRecord::from_ordered(&values));
                    prices.push(price);
                }
                _ => dropped += 1,
            }
        }

        if dropped > 0 {
            warn!(dropped, kept = records.len(), "dropped incomplete rows");
        }
        info!(
            rows = records.len(),
            columns = FIELDS.len() + 1,
            "loaded housing dataset"
        );

        if records.is_empty() {
            return Err(TrainingDataError::Empty { dropped });
        }

        Ok(Self { records, prices })
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Parse one CSV cell; empty and non-numeric cells count as missing.
fn parse_cell(cell: &str) -> Option<f64> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Shuffle sample indices with a fixed seed and split train/test.
///
/// The seed makes the 80/20 partition reproducible across training runs,
/// so persisted metrics always describe a recomputable split.
pub fn split_indices(n_samples: usize, train_ratio: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n_samples).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_train = (n_samples as f64 * train_ratio) as usize;
    let test = indices.split_off(n_train);
    (indices, test)
}

//! Feature engineering for the price model.
//!
//! Transforms a validated [`RawRecord`] into the engineered feature columns
//! the model was trained on. The transformation is a pure function of the
//! record, the fitted bin edges, and an explicit `reference_year`; no
//! wall-clock reads happen here, so training and serving produce
//! bit-identical columns for the same inputs.

use crate::features::bins::{
    CategoryBins, CONDITION_LABELS, GRADE_LABELS, NUM_BUCKETS, VIEWS_LABELS,
};
use crate::preprocessing::PreprocessingError;
use crate::schema::RawRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Base feature columns, in the order fixed at training time.
///
/// `built_year` and `renovation_year` are consumed into `age` and
/// `years_since_renovation` and are not model inputs themselves.
pub const BASE_FEATURES: [&str; 24] = [
    "bedrooms",
    "bathrooms",
    "living_area",
    "lot_area",
    "floors",
    "waterfront",
    "views",
    "condition",
    "grade",
    "house_area",
    "basement_area",
    "age",
    "years_since_renovation",
    "latitude",
    "longitude",
    "living_area_renovated",
    "lot_area_renovated",
    "schools_nearby",
    "airport_distance",
    "has_basement",
    "is_renovated",
    "has_waterfront",
    "living_to_lot_ratio",
    "basement_to_house_ratio",
];

/// The one-hot families: column prefix plus bucket labels.
const CATEGORY_FAMILIES: [(&str, [&str; NUM_BUCKETS]); 3] = [
    ("condition_category", CONDITION_LABELS),
    ("grade_category", GRADE_LABELS),
    ("views_category", VIEWS_LABELS),
];

/// The canonical feature-name list: base columns followed by the one-hot
/// indicator columns with each family's first label dropped as baseline.
/// This order is the single source of truth for column order at training
/// and at inference.
pub fn canonical_feature_names() -> Vec<String> {
    let mut names: Vec<String> = BASE_FEATURES.iter().map(|s| s.to_string()).collect();
    for (prefix, labels) in CATEGORY_FAMILIES.iter() {
        for label in labels.iter().skip(1) {
            names.push(format!("{}_{}", prefix, label));
        }
    }
    names
}

/// An engineered record: named feature values for a single house.
///
/// Produced by [`FeatureEngineer::transform`] and consumed by the aligner;
/// discarded after the request or training row is processed.
#[derive(Debug, Clone, Default)]
pub struct EngineeredRecord {
    values: HashMap<String, f64>,
}

impl EngineeredRecord {
    /// Look up a feature value by column name.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Number of engineered columns.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn insert(&mut self, name: &str, value: f64) {
        self.values.insert(name.to_string(), value);
    }
}

/// Fitted feature engineer.
///
/// Carries the training-time reference year and the frozen categorical bin
/// edges; both persist inside the artifact bundle so inference replays the
/// exact training-time transformation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureEngineer {
    reference_year: i32,
    bins: CategoryBins,
}

impl FeatureEngineer {
    /// Reconstruct an engineer from persisted state.
    pub fn new(reference_year: i32, bins: CategoryBins) -> Self {
        Self {
            reference_year,
            bins,
        }
    }

    /// Fit the engineer on training records: freezes the categorical bin
    /// edges from the observed distribution.
    pub fn fit(reference_year: i32, records: &[RawRecord]) -> Result<Self, PreprocessingError> {
        Ok(Self {
            reference_year,
            bins: CategoryBins::fit(records)?,
        })
    }

    pub fn reference_year(&self) -> i32 {
        self.reference_year
    }

    pub fn bins(&self) -> &CategoryBins {
        &self.bins
    }

    /// Engineer one record. Pure; identical inputs give identical outputs.
    pub fn transform(&self, record: &RawRecord) -> EngineeredRecord {
        let mut out = EngineeredRecord::default();

        out.insert("bedrooms", record.bedrooms);
        out.insert("bathrooms", record.bathrooms);
        out.insert("living_area", record.living_area);
        out.insert("lot_area", record.lot_area);
        out.insert("floors", record.floors);
        out.insert("waterfront", record.waterfront);
        out.insert("views", record.views);
        out.insert("condition", record.condition);
        out.insert("grade", record.grade);
        out.insert("house_area", record.house_area);
        out.insert("basement_area", record.basement_area);
        out.insert("latitude", record.latitude);
        out.insert("longitude", record.longitude);
        out.insert("living_area_renovated", record.living_area_renovated);
        out.insert("lot_area_renovated", record.lot_area_renovated);
        out.insert("schools_nearby", record.schools_nearby);
        out.insert("airport_distance", record.airport_distance);

        let age = f64::from(self.reference_year) - record.built_year;
        let years_since_renovation = if record.renovation_year > 0.0 {
            f64::from(self.reference_year) - record.renovation_year
        } else {
            age
        };
        out.insert("age", age);
        out.insert("years_since_renovation", years_since_renovation);

        out.insert(
            "has_basement",
            if record.basement_area > 0.0 { 1.0 } else { 0.0 },
        );
        out.insert(
            "is_renovated",
            if record.renovation_year > 0.0 { 1.0 } else { 0.0 },
        );
        out.insert("has_waterfront", record.waterfront);

        // The +1 in each denominator is a divide-by-zero guard baked into
        // the trained model; changing it would silently skew predictions.
        out.insert(
            "living_to_lot_ratio",
            record.living_area / (record.lot_area + 1.0),
        );
        out.insert(
            "basement_to_house_ratio",
            record.basement_area / (record.house_area + 1.0),
        );

        let buckets = [
            self.bins.condition.bucket(record.condition),
            self.bins.grade.bucket(record.grade),
            self.bins.views.bucket(record.views),
        ];
        for ((prefix, labels), bucket) in CATEGORY_FAMILIES.iter().zip(buckets) {
            // First label is the dropped baseline
            for (idx, label) in labels.iter().enumerate().skip(1) {
                let value = if idx == bucket { 1.0 } else { 0.0 };
                out.insert(&format!("{}_{}", prefix, label), value);
            }
        }

        out
    }

    /// Engineer a batch of records.
    pub fn transform_batch(&self, records: &[RawRecord]) -> Vec<EngineeredRecord> {
        records.iter().map(|r| self.transform(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::bins::BinEdges;

    fn test_bins() -> CategoryBins {
        CategoryBins {
            condition: BinEdges { min: 1.0, max: 10.0 },
            grade: BinEdges { min: 1.0, max: 13.0 },
            views: BinEdges { min: 0.0, max: 4.0 },
        }
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
    fn test_canonical_names_count_and_order() {
        let names = canonical_feature_names();
        assert_eq!(names.len(), 30);
        assert_eq!(names[0], "bedrooms");
        assert_eq!(names[23], "basement_to_house_ratio");
        assert_eq!(names[24], "condition_category_Average");
        assert_eq!(names[25], "condition_category_Good");
        assert_eq!(names[26], "grade_category_Medium");
        assert_eq!(names[27], "grade_category_High");
        assert_eq!(names[28], "views_category_Some");
        assert_eq!(names[29], "views_category_Excellent");
    }

    #[test]
    fn test_age_and_renovation_derivation() {
        let engineer = FeatureEngineer::new(2024, test_bins());

        let record = sample_record();
        let out = engineer.transform(&record);
        assert_eq!(out.get("age"), Some(34.0));
        // Never renovated: years_since_renovation falls back to age
        assert_eq!(out.get("years_since_renovation"), Some(34.0));
        assert_eq!(out.get("is_renovated"), Some(0.0));

        let renovated = RawRecord {
            renovation_year: 2010.0,
            ..record
        };
        let out = engineer.transform(&renovated);
        assert_eq!(out.get("years_since_renovation"), Some(14.0));
        assert_eq!(out.get("is_renovated"), Some(1.0));
    }

    #[test]
    fn test_ratio_denominator_guard() {
        let engineer = FeatureEngineer::new(2024, test_bins());
        let record = sample_record();

        let out = engineer.transform(&record);
        assert_eq!(out.get("living_to_lot_ratio"), Some(1800.0 / 5001.0));
        assert_eq!(out.get("basement_to_house_ratio"), Some(0.0 / 1801.0));
    }

    #[test]
    fn test_indicator_features() {
        let engineer = FeatureEngineer::new(2024, test_bins());
        let record = RawRecord {
            basement_area: 600.0,
            waterfront: 1.0,
            ..sample_record()
        };

        let out = engineer.transform(&record);
        assert_eq!(out.get("has_basement"), Some(1.0));
        assert_eq!(out.get("has_waterfront"), Some(1.0));
    }

    #[test]
    fn test_one_hot_baseline_dropped() {
        let engineer = FeatureEngineer::new(2024, test_bins());
        // condition 3 in [1, 10] -> bucket 0 (the dropped Poor baseline)
        let out = engineer.transform(&sample_record());

        assert_eq!(out.get("condition_category_Average"), Some(0.0));
        assert_eq!(out.get("condition_category_Good"), Some(0.0));
        assert!(out.get("condition_category_Poor").is_none());

        // grade 7 in [1, 13] -> bucket 1 -> Medium
        assert_eq!(out.get("grade_category_Medium"), Some(1.0));
        assert_eq!(out.get("grade_category_High"), Some(0.0));
    }

    #[test]
    fn test_transform_is_deterministic() {
        let engineer = FeatureEngineer::fit(2024, &[sample_record()]).unwrap();
        let a = engineer.transform(&sample_record());
        let b = engineer.transform(&sample_record());

        for name in canonical_feature_names() {
            assert_eq!(a.get(&name), b.get(&name), "column {}", name);
        }
    }

    #[test]
    fn test_fit_freezes_bins_from_training_data() {
        let mut records = Vec::new();
        for condition in [1.0, 5.0, 9.0] {
            records.push(RawRecord {
                condition,
                ..sample_record()
            });
        }

        let engineer = FeatureEngineer::fit(2024, &records).unwrap();
        assert_eq!(engineer.bins().condition.min, 1.0);
        assert_eq!(engineer.bins().condition.max, 9.0);
    }

    #[test]
    fn test_every_canonical_column_is_produced() {
        let engineer = FeatureEngineer::new(2024, test_bins());
        let out = engineer.transform(&sample_record());

        for name in canonical_feature_names() {
            assert!(out.get(&name).is_some(), "column {} not produced", name);
        }
    }
}

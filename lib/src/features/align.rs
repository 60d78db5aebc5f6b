//! Reconciles engineered records against the canonical feature list.
//!
//! One-hot columns come and go depending on which bucket a particular
//! input hits; the model's column order is fixed forever at training time.
//! The aligner bridges the two: absent columns fill with zero, columns the
//! training run never saw are dropped, and the output order always matches
//! the persisted list exactly.

use crate::features::engineering::EngineeredRecord;

/// Alignment of engineered columns to the canonical training order.
pub struct FeatureAligner;

impl FeatureAligner {
    /// Produce a vector of exactly `feature_names.len()` values in the
    /// persisted order. Output length and order are identical across calls
    /// regardless of which one-hot categories the record happened to hit.
    pub fn align(record: &EngineeredRecord, feature_names: &[String]) -> Vec<f64> {
        feature_names
            .iter()
            .map(|name| record.get(name).unwrap_or(0.0))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::bins::{BinEdges, CategoryBins};
    use crate::features::engineering::{canonical_feature_names, FeatureEngineer};
    use crate::schema::RawRecord;

    fn engineer() -> FeatureEngineer {
        FeatureEngineer::new(
            2024,
            CategoryBins {
                condition: BinEdges { min: 1.0, max: 10.0 },
                grade: BinEdges { min: 1.0, max: 13.0 },
                views: BinEdges { min: 0.0, max: 4.0 },
            },
        )
    }

    fn record_with_condition(condition: f64) -> RawRecord {
        RawRecord {
            bedrooms: 3.0,
            bathrooms: 2.0,
            living_area: 1800.0,
            lot_area: 5000.0,
            floors: 1.0,
            waterfront: 0.0,
            views: 0.0,
            condition,
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
    fn test_output_length_matches_feature_list() {
        let names = canonical_feature_names();
        let eng = engineer();

        // Whatever bucket the record hits, the vector length is fixed
        for condition in [1.0, 5.0, 10.0] {
            let engineered = eng.transform(&record_with_condition(condition));
            let aligned = FeatureAligner::align(&engineered, &names);
            assert_eq!(aligned.len(), names.len());
        }
    }

    #[test]
    fn test_missing_columns_fill_with_zero() {
        let names = vec!["bedrooms".to_string(), "never_seen".to_string()];
        let engineered = engineer().transform(&record_with_condition(3.0));

        let aligned = FeatureAligner::align(&engineered, &names);
        assert_eq!(aligned, vec![3.0, 0.0]);
    }

    #[test]
    fn test_extra_columns_dropped_silently() {
        // Only one canonical column: everything else the engineer produced
        // is ignored
        let names = vec!["grade".to_string()];
        let engineered = engineer().transform(&record_with_condition(3.0));

        let aligned = FeatureAligner::align(&engineered, &names);
        assert_eq!(aligned, vec![7.0]);
    }

    #[test]
    fn test_order_follows_feature_list() {
        let names = vec![
            "grade".to_string(),
            "bedrooms".to_string(),
            "bathrooms".to_string(),
        ];
        let engineered = engineer().transform(&record_with_condition(3.0));

        let aligned = FeatureAligner::align(&engineered, &names);
        assert_eq!(aligned, vec![7.0, 3.0, 2.0]);
    }
}

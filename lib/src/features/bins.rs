//! Categorical bucketization with frozen bin edges.
//!
//! Condition, grade and view counts are partitioned into three equal-width
//! buckets spanning the observed `[min, max]` of the *training*
//! distribution. The edges are computed once during training and persisted
//! with the artifact bundle; inference applies the frozen edges and never
//! refits them from a single request, which would produce degenerate
//! buckets and break parity with the trained one-hot columns.

use crate::preprocessing::PreprocessingError;
use crate::schema::RawRecord;
use serde::{Deserialize, Serialize};

/// Bucket labels for the house condition score.
pub const CONDITION_LABELS: [&str; 3] = ["Poor", "Average", "Good"];
/// Bucket labels for the construction grade.
pub const GRADE_LABELS: [&str; 3] = ["Low", "Medium", "High"];
/// Bucket labels for the view count.
pub const VIEWS_LABELS: [&str; 3] = ["None", "Some", "Excellent"];

/// Number of buckets per categorical family.
pub const NUM_BUCKETS: usize = 3;

/// Observed training range of one bucketized column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BinEdges {
    pub min: f64,
    pub max: f64,
}

impl BinEdges {
    /// Learn the observed range from training values.
    ///
    /// # Errors
    /// Returns [`PreprocessingError::EmptyData`] when no values are given.
    pub fn fit<I: IntoIterator<Item = f64>>(values: I) -> Result<Self, PreprocessingError> {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut seen = false;

        for v in values {
            seen = true;
            min = min.min(v);
            max = max.max(v);
        }

        if !seen {
            return Err(PreprocessingError::EmptyData(
                "Cannot fit bin edges on empty data".to_string(),
            ));
        }

        Ok(Self { min, max })
    }

    /// Map a value into a bucket index in `0..NUM_BUCKETS`.
    ///
    /// Buckets are equal-width over `[min, max]`; values outside the
    /// training range clamp into the boundary buckets, so an unseen but
    /// valid input degrades to the nearest category instead of failing.
    pub fn bucket(&self, value: f64) -> usize {
        let width = (self.max - self.min) / NUM_BUCKETS as f64;
        if width <= 0.0 {
            return 0;
        }

        let idx = ((value - self.min) / width).floor();
        idx.clamp(0.0, (NUM_BUCKETS - 1) as f64) as usize
    }
}

/// The frozen bin edges for all three bucketized columns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryBins {
    pub condition: BinEdges,
    pub grade: BinEdges,
    pub views: BinEdges,
}

impl CategoryBins {
    /// Learn all three ranges from the training records.
    pub fn fit(records: &[RawRecord]) -> Result<Self, PreprocessingError> {
        Ok(Self {
            condition: BinEdges::fit(records.iter().map(|r| r.condition))?,
            grade: BinEdges::fit(records.iter().map(|r| r.grade))?,
            views: BinEdges::fit(records.iter().map(|r| r.views))?,
        })
    }
}

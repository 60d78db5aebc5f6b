//! Feature engineering, bucketization and alignment.
//!
//! The deterministic path from a validated raw record to the numeric
//! vector the model consumes: engineer derived columns, bucketize the
//! categorical scores against frozen training-time edges, one-hot expand,
//! then align to the canonical column order persisted with the model.

pub mod align;
pub mod bins;
pub mod engineering;

pub use align::FeatureAligner;
pub use bins::{BinEdges, CategoryBins};
pub use engineering::{canonical_feature_names, EngineeredRecord, FeatureEngineer};

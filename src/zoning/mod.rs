//! Regional Suitability Zoning
//!
//! Classifies every administrative unit of a province for one crop and
//! aggregates the result into zones and area statistics.
//!
//! ## Architecture
//! - `crop_weights.rs` - Per-crop temp/water/soil weight table
//! - `classifier.rs` - Zoning thresholds and province statistics
//! - `engine.rs` - Per-unit scoring and result assembly
//! - `indices.rs` - Sub-scores from measured climate and soil values

pub mod crop_weights;
pub mod classifier;
pub mod engine;
pub mod indices;

// Re-export public API
pub use crop_weights::{CropWeightTable, CropWeights, FALLBACK_CROP};
pub use classifier::{LevelCounts, ZoneClassifier, ZoneStat, ZoneStatistics};
pub use engine::{RegionUnit, SubScores, UnitInput, ZoningEngine, ZoningResult};
pub use indices::{derive_sub_scores, units_from_measurements, CropRequirements, UnitMeasurements};

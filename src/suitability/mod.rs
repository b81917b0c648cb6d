//! Single-Point Suitability Evaluation
//!
//! Scores a set of weighted environmental factors for one location and turns
//! the weighted mean into a suitability level plus remediation advice.
//!
//! ## Architecture
//! - `factor.rs` - Factor records and the range scoring curve
//! - `level.rs` - Suitability levels and the two named threshold sets
//! - `advice.rs` - Remediation rule table
//! - `evaluator.rs` - Weighted aggregation into an `EvaluationResult`

pub mod factor;
pub mod level;
pub mod advice;
pub mod evaluator;

// Re-export public API
pub use factor::{score_factor, Factor, FactorScore, RangeFit, ValueRange};
pub use level::{classify_evaluation_score, classify_zone_score, SuitabilityLevel};
pub use advice::{generate_recommendations, FactorKind};
pub use evaluator::{evaluate, EvaluationResult};

//! Crop Suitability Engine
//!
//! Multi-criteria suitability scoring and zoning for provincial crop planning,
//! with a shared TTL result cache in front of it.
//!
//! - `suitability/`: Factor scoring, weighted evaluation, remediation advice
//! - `zoning/`: Crop weights, zone classification, province zoning
//! - `result_cache`: Thread-safe TTL cache keyed by request signature
//! - `context`: Engine context (config, cache, status, analysis runs)
//! - `api_server`: Axum REST API (feature `api`)

pub mod error;
pub mod config;
pub mod suitability;
pub mod zoning;
pub mod result_cache;
pub mod context;

#[cfg(feature = "api")]
pub mod api_server;

// Re-export commonly used types
pub use error::{ErrorKind, Result, SuitabilityError};
pub use config::{EngineConfig, TtlClass};
pub use suitability::{
    classify_evaluation_score, classify_zone_score, evaluate, score_factor, EvaluationResult, Factor, FactorScore,
    SuitabilityLevel,
};
pub use zoning::{
    CropRequirements, CropWeightTable, CropWeights, RegionUnit, SubScores, UnitInput, UnitMeasurements,
    ZoneClassifier, ZoneStat, ZoneStatistics, ZoningEngine, ZoningResult,
};
pub use result_cache::{cache_key, Clock, ResultCache, SystemClock};
pub use context::{AnalysisRun, CachedResult, EngineContext, StatusSnapshot, SystemStatus};

#[cfg(feature = "api")]
pub use api_server::{create_router, AppState};

//! Engine Context
//!
//! Owns everything that outlives a single request: configuration, the
//! zoning engine, the result cache, system status and the record of the last
//! analysis run. Built once at startup and shared (`Arc`) with handlers.
//!
//! Lifecycle: `new` (Uninitialized) → `initialize` (Initializing → Ready, or
//! Failed) → `begin_analysis_run` any number of times, each one clearing the
//! cache so no result computed from older source data survives.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{EngineConfig, TtlClass};
use crate::error::{Result, SuitabilityError};
use crate::result_cache::{cache_key, ResultCache};
use crate::suitability::{evaluate, EvaluationResult, Factor};
use crate::zoning::{
    units_from_measurements, CropRequirements, CropWeightTable, UnitInput, UnitMeasurements, ZoningEngine,
    ZoningResult,
};

/// Unit count above which zoning runs on the rayon pool
const PARALLEL_ZONING_THRESHOLD: usize = 256;

const STATUS_KEY: &str = "system_status";
const EVALUATE_ENDPOINT: &str = "suitability_evaluate";
const ZONING_ENDPOINT: &str = "zoning_generate";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SystemStatus {
    Uninitialized,
    Initializing,
    Ready,
    Failed,
}

/// Record of one analysis run (a data refresh)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRun {
    pub run_id: u64,
    pub started_at: DateTime<Utc>,
    /// Cache entries discarded when the run began
    pub cleared_entries: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    pub status: SystemStatus,
    pub initialized: bool,
    pub timestamp: DateTime<Utc>,
    pub cached_entries: usize,
    pub last_run: Option<AnalysisRun>,
}

/// Values held in the shared result cache
#[derive(Debug, Clone)]
pub enum CachedResult {
    Evaluation(EvaluationResult),
    Zoning(ZoningResult),
    Status(StatusSnapshot),
}

#[derive(Debug)]
struct ContextState {
    status: SystemStatus,
    zoning: Option<Arc<ZoningEngine>>,
    last_run: Option<AnalysisRun>,
    next_run_id: u64,
}

pub struct EngineContext {
    config: EngineConfig,
    cache: ResultCache<CachedResult>,
    state: Mutex<ContextState>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ZoningKey<'a> {
    crop_type: &'a str,
    precision: &'a str,
    units: &'a [UnitInput],
}

impl EngineContext {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            cache: ResultCache::new(),
            state: Mutex::new(ContextState {
                status: SystemStatus::Uninitialized,
                zoning: None,
                last_run: None,
                next_run_id: 1,
            }),
        }
    }

    /// `new` followed by `initialize`
    pub fn initialized(config: EngineConfig) -> anyhow::Result<Arc<Self>> {
        let context = Arc::new(Self::new(config));
        context.initialize()?;
        Ok(context)
    }

    fn state(&self) -> MutexGuard<'_, ContextState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_status(&self, status: SystemStatus) {
        self.state().status = status;
    }

    /// Load the crop weight table and build the zoning engine
    pub fn initialize(&self) -> anyhow::Result<()> {
        tracing::info!("Initializing suitability engine...");
        self.set_status(SystemStatus::Initializing);

        match self.build_zoning_engine() {
            Ok(engine) => {
                tracing::info!(
                    "Suitability engine ready: {} crops, province area {} km²",
                    engine.weights().len(),
                    engine.province_area()
                );
                {
                    let mut state = self.state();
                    state.zoning = Some(Arc::new(engine));
                    state.status = SystemStatus::Ready;
                }
                self.cache.invalidate_all();
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Suitability engine initialization failed: {:#}", e);
                self.set_status(SystemStatus::Failed);
                self.cache.invalidate_all();
                Err(e)
            }
        }
    }

    fn build_zoning_engine(&self) -> anyhow::Result<ZoningEngine> {
        let table = self.config.crop_weight_table()?;
        Ok(ZoningEngine::new(table, self.config.province_area_km2)?)
    }

    fn zoning_engine(&self) -> Result<Arc<ZoningEngine>> {
        self.state()
            .zoning
            .clone()
            .ok_or_else(|| SuitabilityError::configuration("zoning engine is not initialized"))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cache(&self) -> &ResultCache<CachedResult> {
        &self.cache
    }

    /// Crop weight table in use, if initialized
    pub fn crop_weights(&self) -> Option<CropWeightTable> {
        self.state().zoning.as_ref().map(|z| z.weights().clone())
    }

    /// Current status, cached for the summary TTL
    pub fn status(&self) -> StatusSnapshot {
        if let Some(hit) = self.cache.lookup(STATUS_KEY) {
            if let CachedResult::Status(snapshot) = hit.as_ref() {
                return snapshot.clone();
            }
            tracing::warn!("Cache entry '{}' holds a different result kind, ignoring", STATUS_KEY);
        }

        // Stored under the state lock; analysis runs clear the cache under
        // the same lock
        let state = self.state();
        let snapshot = StatusSnapshot {
            status: state.status,
            initialized: state.zoning.is_some(),
            timestamp: Utc::now(),
            cached_entries: self.cache.len(),
            last_run: state.last_run.clone(),
        };
        self.cache.store(
            STATUS_KEY,
            CachedResult::Status(snapshot.clone()),
            self.config.ttl_for(TtlClass::Summary),
        );
        snapshot
    }

    /// Start an analysis run over refreshed source data.
    /// Every cached result is dropped first.
    pub fn begin_analysis_run(&self) -> Result<AnalysisRun> {
        // Clearing under the state lock keeps `status()` from caching a
        // snapshot of the previous run in between
        let mut state = self.state();
        if state.zoning.is_none() {
            return Err(SuitabilityError::configuration("engine must be initialized before an analysis run"));
        }

        let cleared_entries = self.cache.invalidate_all();
        let run = AnalysisRun {
            run_id: state.next_run_id,
            started_at: Utc::now(),
            cleared_entries,
        };
        state.next_run_id += 1;
        state.last_run = Some(run.clone());
        drop(state);

        tracing::info!("Analysis run {} started ({} cached results cleared)", run.run_id, cleared_entries);
        Ok(run)
    }

    /// Cached computation of one result kind. An entry of another kind under
    /// the same key is treated as a miss and replaced.
    fn cached<T, X, W, F>(&self, key: &str, class: TtlClass, extract: X, wrap: W, compute: F) -> Result<T>
    where
        T: Clone,
        X: Fn(&CachedResult) -> Option<&T>,
        W: FnOnce(T) -> CachedResult,
        F: FnOnce() -> Result<T>,
    {
        let entry = self
            .cache
            .get_or_compute_if(key, self.config.ttl_for(class), |v| extract(v).is_some(), || {
                compute().map(wrap)
            })?;
        extract(entry.as_ref())
            .cloned()
            .ok_or_else(|| SuitabilityError::configuration(format!("cache entry '{}' has the wrong result kind", key)))
    }

    /// Cached single-point evaluation
    pub fn evaluate(&self, factors: &[Factor]) -> Result<EvaluationResult> {
        let key = cache_key(EVALUATE_ENDPOINT, Some(factors))?;
        self.cached(
            &key,
            TtlClass::Report,
            |v| match v {
                CachedResult::Evaluation(result) => Some(result),
                _ => None,
            },
            CachedResult::Evaluation,
            || evaluate(factors),
        )
    }

    /// Cached zoning run. `precision` defaults to the configured one.
    pub fn generate_zoning(&self, crop_type: &str, precision: Option<&str>, units: &[UnitInput]) -> Result<ZoningResult> {
        let precision = precision.unwrap_or(self.config.default_precision.as_str());
        let key = cache_key(
            ZONING_ENDPOINT,
            Some(&ZoningKey {
                crop_type,
                precision,
                units,
            }),
        )?;

        self.cached(
            &key,
            TtlClass::Report,
            |v| match v {
                CachedResult::Zoning(result) => Some(result),
                _ => None,
            },
            CachedResult::Zoning,
            || {
                let engine = self.zoning_engine()?;
                if units.len() >= PARALLEL_ZONING_THRESHOLD {
                    engine.generate_zoning_parallel(crop_type, precision, units)
                } else {
                    engine.generate_zoning(crop_type, precision, units)
                }
            },
        )
    }

    /// Zoning run over measured unit conditions
    pub fn generate_zoning_from_measurements(
        &self,
        crop_type: &str,
        precision: Option<&str>,
        requirements: &CropRequirements,
        measurements: &[UnitMeasurements],
    ) -> Result<ZoningResult> {
        let units = units_from_measurements(measurements, requirements)?;
        self.generate_zoning(crop_type, precision, &units)
    }
}

//! Engine Configuration
//!
//! Defaults match the provincial deployment (Hunan, 211 800 km²). Every value
//! can be overridden from the environment:
//!
//! | Variable            | Field               | Default  |
//! |---------------------|---------------------|----------|
//! | `PROVINCE_AREA_KM2` | `province_area_km2` | 211800   |
//! | `SUMMARY_TTL_SECS`  | `summary_ttl_secs`  | 60       |
//! | `REPORT_TTL_SECS`   | `report_ttl_secs`   | 600      |
//! | `CROP_WEIGHTS_PATH` | `crop_weights_path` | built-in |
//! | `DEFAULT_PRECISION` | `default_precision` | county   |

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::zoning::CropWeightTable;

pub const DEFAULT_PROVINCE_AREA_KM2: f64 = 211_800.0;
pub const DEFAULT_SUMMARY_TTL_SECS: u64 = 60;
pub const DEFAULT_REPORT_TTL_SECS: u64 = 600;
pub const DEFAULT_PRECISION: &str = "county";

/// Cache validity class of a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtlClass {
    /// Fast-changing summaries (system status)
    Summary,
    /// Derived evaluation, chart and report datasets
    Report,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub province_area_km2: f64,
    pub summary_ttl_secs: u64,
    pub report_ttl_secs: u64,
    pub crop_weights_path: Option<PathBuf>,
    pub default_precision: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            province_area_km2: DEFAULT_PROVINCE_AREA_KM2,
            summary_ttl_secs: DEFAULT_SUMMARY_TTL_SECS,
            report_ttl_secs: DEFAULT_REPORT_TTL_SECS,
            crop_weights_path: None,
            default_precision: DEFAULT_PRECISION.to_string(),
        }
    }
}

impl EngineConfig {
    /// Configuration from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Configuration from an arbitrary key lookup (unset keys keep defaults)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = lookup("PROVINCE_AREA_KM2") {
            config.province_area_km2 = v
                .trim()
                .parse()
                .with_context(|| format!("PROVINCE_AREA_KM2 is not a number: {:?}", v))?;
        }
        if let Some(v) = lookup("SUMMARY_TTL_SECS") {
            config.summary_ttl_secs = v
                .trim()
                .parse()
                .with_context(|| format!("SUMMARY_TTL_SECS is not a whole number of seconds: {:?}", v))?;
        }
        if let Some(v) = lookup("REPORT_TTL_SECS") {
            config.report_ttl_secs = v
                .trim()
                .parse()
                .with_context(|| format!("REPORT_TTL_SECS is not a whole number of seconds: {:?}", v))?;
        }
        if let Some(v) = lookup("CROP_WEIGHTS_PATH") {
            if !v.trim().is_empty() {
                config.crop_weights_path = Some(PathBuf::from(v.trim()));
            }
        }
        if let Some(v) = lookup("DEFAULT_PRECISION") {
            if !v.trim().is_empty() {
                config.default_precision = v.trim().to_string();
            }
        }

        Ok(config)
    }

    pub fn summary_ttl(&self) -> Duration {
        Duration::from_secs(self.summary_ttl_secs)
    }

    pub fn report_ttl(&self) -> Duration {
        Duration::from_secs(self.report_ttl_secs)
    }

    pub fn ttl_for(&self, class: TtlClass) -> Duration {
        match class {
            TtlClass::Summary => self.summary_ttl(),
            TtlClass::Report => self.report_ttl(),
        }
    }

    /// Crop weight table from `crop_weights_path`, or the built-in one
    pub fn crop_weight_table(&self) -> Result<CropWeightTable> {
        match &self.crop_weights_path {
            Some(path) => CropWeightTable::load(path),
            None => Ok(CropWeightTable::builtin()),
        }
    }
}

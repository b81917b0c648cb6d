//! Zoning Engine
//!
//! Runs the zone classifier over every administrative unit for one crop and
//! assembles the spatial dataset, per-level zones and province statistics.
//!
//! Per unit: `overall = temp·w.temp + water·w.water + soil·w.soil`, where the
//! weights come from the crop weight table. Sub-scores must come from real
//! measurements (see `indices.rs`); identical input yields an identical
//! `ZoningResult`, sequential or parallel.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::classifier::{LevelCounts, ZoneClassifier, ZoneStatistics};
use super::crop_weights::{CropWeightTable, CropWeights};
use crate::error::{require_finite, Result, SuitabilityError};
use crate::suitability::level::SuitabilityLevel;

/// Temperature, water and soil sub-scores for one unit (0-100 scale)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubScores {
    pub temp: f64,
    pub water: f64,
    pub soil: f64,
}

impl SubScores {
    pub fn new(temp: f64, water: f64, soil: f64) -> Self {
        Self { temp, water, soil }
    }

    pub fn weighted(&self, w: &CropWeights) -> f64 {
        self.temp * w.temp + self.water * w.water + self.soil * w.soil
    }
}

/// One administrative unit as supplied by the input adapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitInput {
    pub name: String,
    pub sub_scores: SubScores,
}

impl UnitInput {
    pub fn new(name: impl Into<String>, sub_scores: SubScores) -> Self {
        Self {
            name: name.into(),
            sub_scores,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(SuitabilityError::invalid_input("unit name is empty"));
        }
        require_finite(self.sub_scores.temp, &format!("temp sub-score of '{}'", self.name))?;
        require_finite(self.sub_scores.water, &format!("water sub-score of '{}'", self.name))?;
        require_finite(self.sub_scores.soil, &format!("soil sub-score of '{}'", self.name))?;
        Ok(())
    }
}

/// Zoning outcome for one unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionUnit {
    pub name: String,
    pub score: f64,
    pub level: SuitabilityLevel,
}

/// Complete zoning run for one crop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoningResult {
    /// One entry per unit, input order
    pub spatial_data: Vec<RegionUnit>,
    pub statistics: ZoneStatistics,
    /// Unit names per level, input order; all four levels present
    pub zones: BTreeMap<SuitabilityLevel, Vec<String>>,
    /// Crop type as requested by the caller
    pub crop_type: String,
    pub precision: String,
}

/// Zoning over a validated crop weight table and a fixed province area
#[derive(Debug, Clone)]
pub struct ZoningEngine {
    weights: CropWeightTable,
    province_area: f64,
}

impl ZoningEngine {
    /// # Errors
    /// `Configuration` if `province_area` is not a positive finite number
    pub fn new(weights: CropWeightTable, province_area: f64) -> Result<Self> {
        if !province_area.is_finite() || province_area <= 0.0 {
            return Err(SuitabilityError::configuration(format!(
                "province area must be a positive number, got {}",
                province_area
            )));
        }
        Ok(Self {
            weights,
            province_area,
        })
    }

    pub fn weights(&self) -> &CropWeightTable {
        &self.weights
    }

    pub fn province_area(&self) -> f64 {
        self.province_area
    }

    /// Zone every unit for `crop_type`
    pub fn generate_zoning(&self, crop_type: &str, precision: &str, units: &[UnitInput]) -> Result<ZoningResult> {
        let weights = self.prepare(crop_type, units)?;
        let scored: Vec<RegionUnit> = units.iter().map(|u| score_unit(u, &weights)).collect();
        Ok(self.assemble(crop_type, precision, scored))
    }

    /// Same as [`generate_zoning`](Self::generate_zoning), scoring units on
    /// the rayon pool. Output is identical to the sequential version.
    pub fn generate_zoning_parallel(
        &self,
        crop_type: &str,
        precision: &str,
        units: &[UnitInput],
    ) -> Result<ZoningResult> {
        let weights = self.prepare(crop_type, units)?;
        // Indexed collect keeps input order
        let scored: Vec<RegionUnit> = units.par_iter().map(|u| score_unit(u, &weights)).collect();
        Ok(self.assemble(crop_type, precision, scored))
    }

    fn prepare(&self, crop_type: &str, units: &[UnitInput]) -> Result<CropWeights> {
        if units.is_empty() {
            return Err(SuitabilityError::invalid_input("unit list is empty"));
        }
        for unit in units {
            unit.validate()?;
        }

        let (resolved, weights) = self.weights.resolve(crop_type);
        tracing::debug!(
            crop_type,
            resolved,
            units = units.len(),
            "Generating zoning"
        );
        Ok(weights)
    }

    fn assemble(&self, crop_type: &str, precision: &str, spatial_data: Vec<RegionUnit>) -> ZoningResult {
        let mut counts = LevelCounts::default();
        let mut zones: BTreeMap<SuitabilityLevel, Vec<String>> =
            SuitabilityLevel::ALL.iter().map(|&l| (l, Vec::new())).collect();

        for unit in &spatial_data {
            counts.increment(unit.level);
            zones.entry(unit.level).or_default().push(unit.name.clone());
        }

        let statistics = ZoneClassifier::summarize(&counts, self.province_area);

        tracing::info!(
            crop_type,
            units = spatial_data.len(),
            most_suitable = counts.get(SuitabilityLevel::MostSuitable),
            unsuitable = counts.get(SuitabilityLevel::Unsuitable),
            "Zoning complete"
        );

        ZoningResult {
            spatial_data,
            statistics,
            zones,
            crop_type: crop_type.to_string(),
            precision: precision.to_string(),
        }
    }
}

fn score_unit(unit: &UnitInput, weights: &CropWeights) -> RegionUnit {
    let score = unit.sub_scores.weighted(weights);
    RegionUnit {
        name: unit.name.clone(),
        score,
        level: ZoneClassifier::classify(score),
    }
}

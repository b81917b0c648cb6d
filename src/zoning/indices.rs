//! Sub-Score Indices
//!
//! Derives the temperature, water and soil sub-scores of a unit from measured
//! climate and soil values, scored against a crop's requirement ranges with
//! the same curve as single factors.
//!
//! - temp  = score(mean temperature vs temperature range)
//! - water = score(annual precipitation vs precipitation range)
//! - soil  = mean of score(pH) and score(organic matter)

use serde::{Deserialize, Serialize};

use super::engine::{SubScores, UnitInput};
use crate::error::Result;
use crate::suitability::factor::ValueRange;

/// Measured conditions for one administrative unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitMeasurements {
    pub name: String,
    /// Mean growing-season temperature (°C)
    pub mean_temperature: f64,
    /// Annual precipitation (mm)
    pub annual_precipitation: f64,
    pub soil_ph: f64,
    /// Soil organic matter (%)
    pub organic_matter: f64,
}

/// Target ranges a crop grows best in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropRequirements {
    pub temperature: ValueRange,
    pub precipitation: ValueRange,
    pub ph: ValueRange,
    pub organic_matter: ValueRange,
}

impl CropRequirements {
    /// Check every range up front so one bad range fails the whole run
    pub fn validate(&self) -> Result<()> {
        self.temperature.validate("temperature")?;
        self.precipitation.validate("precipitation")?;
        self.ph.validate("ph")?;
        self.organic_matter.validate("organic matter")?;
        Ok(())
    }
}

/// Sub-scores for one unit
pub fn derive_sub_scores(m: &UnitMeasurements, req: &CropRequirements) -> Result<SubScores> {
    let temp = req.temperature.score(m.mean_temperature, "mean temperature")?;
    let water = req.precipitation.score(m.annual_precipitation, "annual precipitation")?;
    let ph = req.ph.score(m.soil_ph, "soil pH")?;
    let organic = req.organic_matter.score(m.organic_matter, "organic matter")?;

    Ok(SubScores::new(temp, water, (ph + organic) / 2.0))
}

/// Zoning inputs for a batch of measured units
pub fn units_from_measurements(measurements: &[UnitMeasurements], req: &CropRequirements) -> Result<Vec<UnitInput>> {
    req.validate()?;
    measurements
        .iter()
        .map(|m| Ok(UnitInput::new(m.name.clone(), derive_sub_scores(m, req)?)))
        .collect()
}

//! Crop Weight Table
//!
//! Each crop maps to a `{temp, water, soil}` weight triple summing to 1.0.
//! The built-in table covers the province's main crops; a JSON file with the
//! same shape can replace it:
//!
//! ```json
//! { "rice": { "temp": 0.3, "water": 0.4, "soil": 0.3 } }
//! ```
//!
//! Unknown crops fall back to the rice weights, so a table must always
//! contain `rice`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SuitabilityError};

/// Crop used when a requested crop type is not in the table
pub const FALLBACK_CROP: &str = "rice";

/// Allowed deviation of a weight triple's sum from 1.0
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Relative importance of the three zoning sub-scores for one crop
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropWeights {
    pub temp: f64,
    pub water: f64,
    pub soil: f64,
}

impl CropWeights {
    pub const fn new(temp: f64, water: f64, soil: f64) -> Self {
        Self { temp, water, soil }
    }

    pub fn sum(&self) -> f64 {
        self.temp + self.water + self.soil
    }

    fn validate(&self, crop: &str) -> Result<()> {
        for (label, w) in [("temp", self.temp), ("water", self.water), ("soil", self.soil)] {
            if !w.is_finite() || w < 0.0 {
                return Err(SuitabilityError::configuration(format!(
                    "crop '{}': {} weight must be a non-negative number, got {}",
                    crop, label, w
                )));
            }
        }
        if (self.sum() - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(SuitabilityError::configuration(format!(
                "crop '{}': weights sum to {}, expected 1.0",
                crop,
                self.sum()
            )));
        }
        Ok(())
    }
}

/// Built-in weights (temp, water, soil)
const BUILTIN_WEIGHTS: [(&str, CropWeights); 12] = [
    ("rice", CropWeights::new(0.3, 0.4, 0.3)),
    ("corn", CropWeights::new(0.25, 0.35, 0.4)),
    ("soybean", CropWeights::new(0.2, 0.3, 0.5)),
    ("wheat", CropWeights::new(0.35, 0.25, 0.4)),
    ("cotton", CropWeights::new(0.4, 0.3, 0.3)),
    ("rapeseed", CropWeights::new(0.3, 0.2, 0.5)),
    ("peanut", CropWeights::new(0.25, 0.25, 0.5)),
    ("sweet_potato", CropWeights::new(0.3, 0.3, 0.4)),
    ("tobacco", CropWeights::new(0.35, 0.25, 0.4)),
    ("tea", CropWeights::new(0.4, 0.35, 0.25)),
    ("citrus", CropWeights::new(0.45, 0.3, 0.25)),
    ("vegetables", CropWeights::new(0.2, 0.4, 0.4)),
];

/// Normalise a crop name to its table key: lowercase, spaces and dashes as `_`
pub fn crop_key(crop_type: &str) -> String {
    crop_type
        .trim()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .flat_map(char::to_lowercase)
        .collect()
}

/// Validated, closed lookup table of crop weights
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CropWeightTable {
    entries: BTreeMap<String, CropWeights>,
}

impl CropWeightTable {
    /// The built-in table
    pub fn builtin() -> Self {
        let entries = BUILTIN_WEIGHTS
            .iter()
            .map(|(name, w)| (name.to_string(), *w))
            .collect();
        Self { entries }
    }

    /// Build a table from raw entries, validating every triple
    pub fn from_entries<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, CropWeights)>,
        S: AsRef<str>,
    {
        let entries: BTreeMap<String, CropWeights> = entries
            .into_iter()
            .map(|(name, w)| (crop_key(name.as_ref()), w))
            .collect();

        for (crop, w) in &entries {
            w.validate(crop)?;
        }
        if !entries.contains_key(FALLBACK_CROP) {
            return Err(SuitabilityError::configuration(format!(
                "crop weight table must contain the fallback crop '{}'",
                FALLBACK_CROP
            )));
        }

        Ok(Self { entries })
    }

    /// Parse a JSON object of `crop -> {temp, water, soil}`
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, CropWeights> = serde_json::from_str(json)
            .map_err(|e| SuitabilityError::configuration(format!("malformed crop weight table: {}", e)))?;
        Self::from_entries(raw)
    }

    /// Load and validate a crop weight table from a JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read crop weight table: {:?}", path))?;

        let table = Self::from_json_str(&contents)
            .with_context(|| format!("Invalid crop weight table: {:?}", path))?;

        tracing::info!("Loaded {} crop weight entries from {:?}", table.len(), path);
        Ok(table)
    }

    /// Weights for a crop, falling back to rice for unknown crops.
    /// Returns the key actually used alongside the weights.
    pub fn resolve(&self, crop_type: &str) -> (&str, CropWeights) {
        let key = crop_key(crop_type);
        if let Some((name, w)) = self.entries.get_key_value(&key) {
            return (name.as_str(), *w);
        }

        tracing::debug!("Unknown crop type '{}', using {} weights", crop_type, FALLBACK_CROP);
        match self.entries.get_key_value(FALLBACK_CROP) {
            Some((name, w)) => (name.as_str(), *w),
            // Unreachable for tables built through the constructors
            None => (FALLBACK_CROP, BUILTIN_WEIGHTS[0].1),
        }
    }

    pub fn get(&self, crop_type: &str) -> Option<CropWeights> {
        self.entries.get(&crop_key(crop_type)).copied()
    }

    pub fn crops(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CropWeightTable {
    fn default() -> Self {
        Self::builtin()
    }
}

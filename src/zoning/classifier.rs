//! Zone Classifier
//!
//! Maps per-unit zoning scores to suitability levels and turns the resulting
//! level counts into province-level statistics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::suitability::level::{classify_zone_score, SuitabilityLevel};

/// Count, share and area of one level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneStat {
    pub count: usize,
    /// Share of all units in percent, rounded to 1 decimal
    pub percentage: f64,
    /// `count × (province area / unit count)`, rounded half to even
    pub area: f64,
}

/// Statistics keyed by level; always holds all four levels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneStatistics(pub BTreeMap<SuitabilityLevel, ZoneStat>);

impl ZoneStatistics {
    pub fn get(&self, level: SuitabilityLevel) -> Option<&ZoneStat> {
        self.0.get(&level)
    }

    pub fn total_count(&self) -> usize {
        self.0.values().map(|s| s.count).sum()
    }

    pub fn total_percentage(&self) -> f64 {
        self.0.values().map(|s| s.percentage).sum()
    }

    pub fn total_area(&self) -> f64 {
        self.0.values().map(|s| s.area).sum()
    }
}

/// Round half to even at `decimals` places
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

/// Zone classification with the coarse zoning cut set
pub struct ZoneClassifier;

impl ZoneClassifier {
    pub fn classify(score: f64) -> SuitabilityLevel {
        classify_zone_score(score)
    }

    /// Statistics for a set of level counts
    ///
    /// `total_units` must be non-zero; the engine rejects empty unit lists
    /// before getting here.
    pub fn summarize(counts: &LevelCounts, province_area: f64) -> ZoneStatistics {
        let total_units = counts.total();
        let avg_unit_area = if total_units > 0 {
            province_area / total_units as f64
        } else {
            0.0
        };

        let stats = SuitabilityLevel::ALL
            .iter()
            .map(|&level| {
                let count = counts.get(level);
                let percentage = if total_units > 0 {
                    round_to(count as f64 / total_units as f64 * 100.0, 1)
                } else {
                    0.0
                };
                let stat = ZoneStat {
                    count,
                    percentage,
                    area: (count as f64 * avg_unit_area).round_ties_even(),
                };
                (level, stat)
            })
            .collect();

        ZoneStatistics(stats)
    }
}

/// Per-level unit counter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelCounts {
    most_suitable: usize,
    suitable: usize,
    marginally_suitable: usize,
    unsuitable: usize,
}

impl LevelCounts {
    pub fn increment(&mut self, level: SuitabilityLevel) {
        *self.slot(level) += 1;
    }

    pub fn get(&self, level: SuitabilityLevel) -> usize {
        match level {
            SuitabilityLevel::MostSuitable => self.most_suitable,
            SuitabilityLevel::Suitable => self.suitable,
            SuitabilityLevel::MarginallySuitable => self.marginally_suitable,
            SuitabilityLevel::Unsuitable => self.unsuitable,
        }
    }

    pub fn total(&self) -> usize {
        self.most_suitable + self.suitable + self.marginally_suitable + self.unsuitable
    }

    fn slot(&mut self, level: SuitabilityLevel) -> &mut usize {
        match level {
            SuitabilityLevel::MostSuitable => &mut self.most_suitable,
            SuitabilityLevel::Suitable => &mut self.suitable,
            SuitabilityLevel::MarginallySuitable => &mut self.marginally_suitable,
            SuitabilityLevel::Unsuitable => &mut self.unsuitable,
        }
    }
}

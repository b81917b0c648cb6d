//! Factor Scorer
//!
//! Scores one environmental factor (temperature, pH, precipitation, ...)
//! against its target range `[min, max]`.
//!
//! ## Scoring curve
//! - Inside the range the score decays linearly from 100 at the midpoint to
//!   80 at either boundary (triangular penalty).
//! - Outside the range it drops 10 points per unit of distance from the
//!   nearest boundary, clamped at 0. Both branches meet at 80 on the boundary.

use serde::{Deserialize, Serialize};

use crate::error::{require_finite, Result, SuitabilityError};

const MAX_SCORE: f64 = 100.0;
const BOUNDARY_SCORE: f64 = 80.0;
const OUT_OF_RANGE_PENALTY_PER_UNIT: f64 = 10.0;

/// One weighted agronomic constraint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Factor {
    pub name: String,
    pub weight: f64,
    pub min: f64,
    pub max: f64,
    pub current_value: f64,
}

impl Factor {
    pub fn new(name: impl Into<String>, weight: f64, min: f64, max: f64, current_value: f64) -> Self {
        Self {
            name: name.into(),
            weight,
            min,
            max,
            current_value,
        }
    }

    pub fn range(&self) -> ValueRange {
        ValueRange::new(self.min, self.max)
    }
}

/// Score of a single factor (0-100)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactorScore {
    pub factor_name: String,
    pub score: f64,
}

/// Closed target interval `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

/// Where a value sits relative to its target range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeFit {
    BelowRange,
    WithinRange,
    AboveRange,
}

impl ValueRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Reject inverted, empty or non-finite ranges
    pub fn validate(&self, label: &str) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(SuitabilityError::invalid_input(format!(
                "range for '{}' must be finite, got [{}, {}]",
                label, self.min, self.max
            )));
        }
        if self.min >= self.max {
            return Err(SuitabilityError::configuration(format!(
                "range for '{}' requires min < max, got [{}, {}]",
                label, self.min, self.max
            )));
        }
        Ok(())
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    pub fn half_width(&self) -> f64 {
        (self.max - self.min) / 2.0
    }

    pub fn fit(&self, value: f64) -> RangeFit {
        if value < self.min {
            RangeFit::BelowRange
        } else if value > self.max {
            RangeFit::AboveRange
        } else {
            RangeFit::WithinRange
        }
    }

    /// Score `value` against this range without validating it first.
    /// Callers must have checked `validate()`.
    fn score_unchecked(&self, value: f64) -> f64 {
        let raw = match self.fit(value) {
            RangeFit::WithinRange => {
                let offset = (value - self.midpoint()).abs() / self.half_width();
                MAX_SCORE - offset * (MAX_SCORE - BOUNDARY_SCORE)
            }
            RangeFit::BelowRange | RangeFit::AboveRange => {
                let distance = (value - self.min).abs().min((value - self.max).abs());
                (BOUNDARY_SCORE - distance * OUT_OF_RANGE_PENALTY_PER_UNIT).max(0.0)
            }
        };
        raw.clamp(0.0, MAX_SCORE)
    }

    /// Validated score of `value` against this range (0-100)
    pub fn score(&self, value: f64, label: &str) -> Result<f64> {
        self.validate(label)?;
        let value = require_finite(value, label)?;
        Ok(self.score_unchecked(value))
    }
}

/// Score a factor's current value against its target range
///
/// Fails with a configuration error when `min >= max` and with an input
/// error when any bound or the current value is not finite.
pub fn score_factor(factor: &Factor) -> Result<f64> {
    factor.range().score(factor.current_value, &factor.name)
}

//! Suitability Evaluator
//!
//! Aggregates per-factor scores into a weight-normalised overall score,
//! classifies it and attaches remediation advice. Pure function of its input.

use serde::{Deserialize, Serialize};

use super::advice::generate_recommendations;
use super::factor::{score_factor, Factor, FactorScore};
use super::level::{classify_evaluation_score, SuitabilityLevel};
use crate::error::{require_finite, Result, SuitabilityError};

/// Outcome of a single-point suitability evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    /// Σ(score × weight) / Σ(weight), 0-100
    pub overall_score: f64,
    pub suitability_level: SuitabilityLevel,
    /// One entry per input factor, input order
    pub factor_scores: Vec<FactorScore>,
    pub recommendations: Vec<String>,
}

/// Evaluate a list of weighted factors
///
/// # Errors
/// - `InvalidInput` for an empty list or a weight that is not a positive
///   finite number
/// - `Configuration` for any factor with `min >= max`
pub fn evaluate(factors: &[Factor]) -> Result<EvaluationResult> {
    if factors.is_empty() {
        return Err(SuitabilityError::invalid_input("factor list is empty"));
    }

    let mut factor_scores = Vec::with_capacity(factors.len());
    let mut weighted_sum = 0.0;
    // Every weight is positive, so a non-empty list has a positive total
    let mut total_weight = 0.0;

    for factor in factors {
        let weight = require_finite(factor.weight, &format!("weight of '{}'", factor.name))?;
        if weight <= 0.0 {
            return Err(SuitabilityError::invalid_input(format!(
                "weight of '{}' must be positive, got {}",
                factor.name, weight
            )));
        }

        let score = score_factor(factor)?;
        weighted_sum += score * weight;
        total_weight += weight;

        factor_scores.push(FactorScore {
            factor_name: factor.name.clone(),
            score,
        });
    }

    let overall_score = (weighted_sum / total_weight).clamp(0.0, 100.0);
    let suitability_level = classify_evaluation_score(overall_score);
    let recommendations = generate_recommendations(&factor_scores);

    tracing::debug!(
        factors = factors.len(),
        overall_score,
        level = ?suitability_level,
        "Evaluated suitability"
    );

    Ok(EvaluationResult {
        overall_score,
        suitability_level,
        factor_scores,
        recommendations,
    })
}

//! Suitability Levels
//!
//! Ordinal four-step classification shared by single-point evaluation and
//! regional zoning. The two use different cut sets over different score
//! domains, so each has its own named classification function:
//!
//! | Level              | Evaluation | Zoning |
//! |--------------------|-----------:|-------:|
//! | MostSuitable       |       ≥ 80 |   ≥ 80 |
//! | Suitable           |       ≥ 65 |   ≥ 60 |
//! | MarginallySuitable |       ≥ 50 |   ≥ 40 |
//! | Unsuitable         |       < 50 |   < 40 |

use serde::{Deserialize, Serialize};

/// Ordinal suitability level (MostSuitable > Suitable > MarginallySuitable > Unsuitable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SuitabilityLevel {
    Unsuitable,
    MarginallySuitable,
    Suitable,
    MostSuitable,
}

impl SuitabilityLevel {
    /// All levels, best first (report order)
    pub const ALL: [SuitabilityLevel; 4] = [
        SuitabilityLevel::MostSuitable,
        SuitabilityLevel::Suitable,
        SuitabilityLevel::MarginallySuitable,
        SuitabilityLevel::Unsuitable,
    ];

    pub fn display_text(&self) -> &'static str {
        match self {
            SuitabilityLevel::MostSuitable => "Most suitable",
            SuitabilityLevel::Suitable => "Suitable",
            SuitabilityLevel::MarginallySuitable => "Marginally suitable",
            SuitabilityLevel::Unsuitable => "Unsuitable",
        }
    }
}

const EVALUATION_CUTS: [f64; 3] = [80.0, 65.0, 50.0];
const ZONING_CUTS: [f64; 3] = [80.0, 60.0, 40.0];

fn classify_with(score: f64, cuts: &[f64; 3]) -> SuitabilityLevel {
    if score >= cuts[0] {
        SuitabilityLevel::MostSuitable
    } else if score >= cuts[1] {
        SuitabilityLevel::Suitable
    } else if score >= cuts[2] {
        SuitabilityLevel::MarginallySuitable
    } else {
        // NaN falls through to the lowest level
        SuitabilityLevel::Unsuitable
    }
}

/// Level for a single-point weighted evaluation score
pub fn classify_evaluation_score(score: f64) -> SuitabilityLevel {
    classify_with(score, &EVALUATION_CUTS)
}

/// Level for a per-unit zoning score (temp/water/soil weighted average)
pub fn classify_zone_score(score: f64) -> SuitabilityLevel {
    classify_with(score, &ZONING_CUTS)
}

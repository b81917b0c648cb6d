//! Recommendation Rules
//!
//! Deterministic rule table keyed by factor kind. A recognised factor scoring
//! below [`ADVICE_THRESHOLD`] contributes its remediation message; messages
//! follow the caller's factor order. When nothing fires, a single
//! "maintain current practices" message is returned.

use super::factor::FactorScore;

/// Factor scores strictly below this trigger advice
pub const ADVICE_THRESHOLD: f64 = 70.0;

pub const MAINTAIN_PRACTICES: &str =
    "Current conditions are favourable; maintain existing management practices";

/// Factor kinds with a remediation rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FactorKind {
    Temperature,
    SoilPh,
    OrganicMatter,
    Precipitation,
    WinterTemperature,
}

impl FactorKind {
    /// Recognise a factor by name. Case, `_`, `-` and spaces are ignored so
    /// `winterTemp`, `winter_temp` and `Winter Temperature` all match.
    pub fn from_name(name: &str) -> Option<Self> {
        let key: String = name
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        match key.as_str() {
            "temperature" | "temp" => Some(FactorKind::Temperature),
            "ph" | "soilph" => Some(FactorKind::SoilPh),
            "organic" | "organicmatter" | "soilorganicmatter" => Some(FactorKind::OrganicMatter),
            "precipitation" | "rainfall" => Some(FactorKind::Precipitation),
            "wintertemp" | "wintertemperature" => Some(FactorKind::WinterTemperature),
            _ => None,
        }
    }

    pub fn remediation(&self) -> &'static str {
        match self {
            FactorKind::Temperature => "Consider varieties with wider temperature tolerance",
            FactorKind::SoilPh => "Adjust soil pH with lime or sulphur amendments",
            FactorKind::OrganicMatter => "Increase organic fertiliser to raise soil organic matter",
            FactorKind::Precipitation => "Improve irrigation infrastructure to secure water supply",
            FactorKind::WinterTemperature => "Apply cold protection measures and choose cold-hardy varieties",
        }
    }
}

/// Build the recommendation list for a set of factor scores
pub fn generate_recommendations(scores: &[FactorScore]) -> Vec<String> {
    let mut fired: Vec<FactorKind> = Vec::new();

    for fs in scores {
        if fs.score >= ADVICE_THRESHOLD {
            continue;
        }
        if let Some(kind) = FactorKind::from_name(&fs.factor_name) {
            // One message per kind even if the factor is listed twice
            if !fired.contains(&kind) {
                fired.push(kind);
            }
        }
    }

    if fired.is_empty() {
        return vec![MAINTAIN_PRACTICES.to_string()];
    }

    fired.iter().map(|k| k.remediation().to_string()).collect()
}

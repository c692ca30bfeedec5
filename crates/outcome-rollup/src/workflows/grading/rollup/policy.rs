use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Formula used to turn assessment scores into LO achievement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoFormula {
    /// `Σ score × contribution / 100`, defined only when contributions sum to 100.
    #[default]
    ContributionGated,
    /// Superseded rule: average of scored edges weighted by `weight × contribution`,
    /// with no completeness gate.
    LegacyNormalized,
}

impl LoFormula {
    pub const fn label(self) -> &'static str {
        match self {
            LoFormula::ContributionGated => "contribution_gated",
            LoFormula::LegacyNormalized => "legacy_normalized",
        }
    }
}

impl fmt::Display for LoFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown LO formula '{0}' (expected contribution_gated or legacy_normalized)")]
pub struct UnknownLoFormula(pub String);

impl FromStr for LoFormula {
    type Err = UnknownLoFormula;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "contribution_gated" | "gated" => Ok(LoFormula::ContributionGated),
            "legacy_normalized" | "legacy" => Ok(LoFormula::LegacyNormalized),
            _ => Err(UnknownLoFormula(value.to_string())),
        }
    }
}

/// Business-rule selection for a rollup run. Letter banding uses one fixed table and is
/// not configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GradingPolicy {
    pub lo_formula: LoFormula,
}

impl GradingPolicy {
    pub fn new(lo_formula: LoFormula) -> Self {
        Self { lo_formula }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_formula_names() {
        assert_eq!(
            "contribution_gated".parse::<LoFormula>(),
            Ok(LoFormula::ContributionGated)
        );
        assert_eq!(" Legacy ".parse::<LoFormula>(), Ok(LoFormula::LegacyNormalized));
        assert!("weighted".parse::<LoFormula>().is_err());
        assert_eq!(GradingPolicy::default().lo_formula, LoFormula::ContributionGated);
    }
}

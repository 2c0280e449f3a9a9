use core::str::FromStr;

use serde::{Deserialize, Serialize};

use mto_core::DomainError;

/// How per-(discipline, lab) needs combine into one required quantity.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMode {
    /// Every row is stocked independently: plain sum.
    #[default]
    Sum,
    /// Within one lab the same equipment is reused across disciplines, so only
    /// the lab's peak need counts; different labs are summed.
    MaxPerLab,
}

impl AggregationMode {
    pub fn as_str(self) -> &'static str {
        match self {
            AggregationMode::Sum => "sum",
            AggregationMode::MaxPerLab => "max_per_lab",
        }
    }
}

impl core::fmt::Display for AggregationMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AggregationMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sum" => Ok(AggregationMode::Sum),
            "max_per_lab" => Ok(AggregationMode::MaxPerLab),
            other => Err(DomainError::validation(format!(
                "mode must be one of: sum, max_per_lab (got '{other}')"
            ))),
        }
    }
}

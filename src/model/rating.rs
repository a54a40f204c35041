use serde::{Deserialize, Serialize};
use std::fmt;

/// DORA performance band, derived on read from a scalar metric value.
///
/// `Unknown` is the no-data sentinel for lead time, time to restore and
/// change failure rate; deployment frequency reports `Low` on silence
/// instead, treating absence of deployments as evidence of low frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Elite,
    High,
    Medium,
    Low,
    Unknown,
}

impl Rating {
    /// Ordinal score used when averaging the four calculators into an
    /// overall performance label. `Unknown` scores 0 and is excluded from
    /// the averaging denominator by the caller.
    pub fn score(&self) -> u32 {
        match self {
            Rating::Elite => 4,
            Rating::High => 3,
            Rating::Medium => 2,
            Rating::Low => 1,
            Rating::Unknown => 0,
        }
    }

    pub fn from_score(score: u32) -> Self {
        match score {
            4.. => Rating::Elite,
            3 => Rating::High,
            2 => Rating::Medium,
            1 => Rating::Low,
            0 => Rating::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Rating::Elite => "elite",
            Rating::High => "high",
            Rating::Medium => "medium",
            Rating::Low => "low",
            Rating::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

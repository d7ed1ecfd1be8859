//! Phase module - the two presentation stages per scenario

use serde::{Deserialize, Serialize};

/// Presentation phase within a scenario
///
/// Every scenario is shown twice, in order:
/// - Initial: the system's recommendation alone
/// - Updated: the same recommendation plus newly revealed evidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Recommendation only
    Initial,

    /// Recommendation plus additional evidence
    Updated,
}

impl Phase {
    /// Get the phase name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Initial => "initial",
            Phase::Updated => "updated",
        }
    }

    /// Parse a phase from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "initial" => Some(Phase::Initial),
            "updated" => Some(Phase::Updated),
            _ => None,
        }
    }

    /// Get the next phase within the same scenario
    pub fn next(&self) -> Option<Self> {
        match self {
            Phase::Initial => Some(Phase::Updated),
            Phase::Updated => None, // Scenario exhausted
        }
    }

    /// Get the previous phase within the same scenario
    pub fn previous(&self) -> Option<Self> {
        match self {
            Phase::Initial => None, // Already at the start
            Phase::Updated => Some(Phase::Initial),
        }
    }
}

impl std::str::FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid phase: {}", s))
    }
}

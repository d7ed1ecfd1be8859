//! Closing questionnaire types

use serde::{Deserialize, Serialize};

/// How the participant's trust changed over the study
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrustChange {
    /// Trust increased
    Increased,

    /// Trust decreased
    Decreased,

    /// Trust stayed the same
    Unchanged,
}

impl TrustChange {
    /// Get the selection name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            TrustChange::Increased => "increased",
            TrustChange::Decreased => "decreased",
            TrustChange::Unchanged => "unchanged",
        }
    }

    /// Parse a selection from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "increased" => Some(TrustChange::Increased),
            "decreased" => Some(TrustChange::Decreased),
            "unchanged" => Some(TrustChange::Unchanged),
            _ => None,
        }
    }
}

impl std::str::FromStr for TrustChange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid trust change: {}", s))
    }
}

/// The closing questionnaire, populated once at study end
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Questionnaire {
    /// Trust-change selection
    pub trust_change: TrustChange,

    /// Factors that influenced trust (at least one)
    pub trust_factors: Vec<String>,

    /// Required free-text opinion
    pub ai_opinion: String,

    /// Optional closing comments
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

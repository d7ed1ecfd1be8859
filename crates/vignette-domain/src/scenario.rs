//! Scenario definitions and per-phase response entries

use crate::Phase;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One clinical-decision scenario as presented to the participant
///
/// The patient summary and recommendation are shown in both phases; the
/// additional evidence is revealed only in the updated phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Short stable identifier (tags every response entry)
    pub id: String,

    /// Display title
    pub title: String,

    /// Patient presentation shown to the participant
    pub patient_summary: String,

    /// The system's recommendation under evaluation
    pub recommendation: String,

    /// Evidence revealed only in the updated phase
    pub updated_evidence: String,
}

/// Ordered, non-empty set of scenario definitions
///
/// The expected number of response entries is always derived from this
/// list (two per scenario, one per phase), never from a separate constant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioSet(Vec<Scenario>);

impl ScenarioSet {
    /// Create a scenario set from an ordered list of definitions
    ///
    /// Returns an error if the list is empty or contains duplicate ids.
    pub fn new(scenarios: Vec<Scenario>) -> Result<Self, String> {
        if scenarios.is_empty() {
            return Err("Scenario set must contain at least one scenario".to_string());
        }
        for (i, scenario) in scenarios.iter().enumerate() {
            if scenarios[..i].iter().any(|s| s.id == scenario.id) {
                return Err(format!("Duplicate scenario id: {}", scenario.id));
            }
        }
        Ok(Self(scenarios))
    }

    /// Number of scenarios
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty (never true for a constructed set)
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the scenario at the given presentation index
    pub fn get(&self, index: usize) -> Option<&Scenario> {
        self.0.get(index)
    }

    /// Expected response-entry count for a complete traversal
    ///
    /// One entry per (scenario, phase) pair: twice the scenario count.
    pub fn expected_responses(&self) -> usize {
        2 * self.0.len()
    }

    /// Iterate over the scenario definitions in presentation order
    pub fn iter(&self) -> impl Iterator<Item = &Scenario> {
        self.0.iter()
    }
}

/// Trust rating on the bounded 0-100 scale, default midpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct TrustRating(u8);

impl TrustRating {
    /// Midpoint of the scale, the pre-selected value
    pub const MIDPOINT: u8 = 50;

    /// Create a rating, rejecting values above 100
    pub fn new(value: u8) -> Result<Self, String> {
        if value > 100 {
            return Err(format!("Trust rating {} is outside 0-100", value));
        }
        Ok(Self(value))
    }

    /// The rating value
    pub fn value(&self) -> u8 {
        self.0
    }
}

impl Default for TrustRating {
    fn default() -> Self {
        Self(Self::MIDPOINT)
    }
}

impl TryFrom<u8> for TrustRating {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TrustRating> for u8 {
    fn from(rating: TrustRating) -> Self {
        rating.0
    }
}

/// The mandatory "would you follow this recommendation" selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FollowChoice {
    /// Would act on the recommendation
    Follow,

    /// Would not act on the recommendation
    Reject,

    /// Cannot decide either way
    Unsure,
}

impl FollowChoice {
    /// Get the choice name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            FollowChoice::Follow => "follow",
            FollowChoice::Reject => "reject",
            FollowChoice::Unsure => "unsure",
        }
    }

    /// Parse a choice from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "follow" => Some(FollowChoice::Follow),
            "reject" => Some(FollowChoice::Reject),
            "unsure" => Some(FollowChoice::Unsure),
            _ => None,
        }
    }
}

impl std::str::FromStr for FollowChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid follow choice: {}", s))
    }
}

/// One recorded response entry, tagged with its (scenario, phase) pair
///
/// Entries are appended in presentation order and never mutated after
/// insertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioResponse {
    /// Id of the scenario this entry answers
    pub scenario_id: String,

    /// Which presentation phase was answered
    pub phase: Phase,

    /// Trust rating on the 0-100 scale
    pub trust_rating: TrustRating,

    /// The mandatory follow selection
    pub follow_choice: FollowChoice,

    /// Optional free-text rationale
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,

    /// When the entry was recorded
    pub recorded_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario(id: &str) -> Scenario {
        Scenario {
            id: id.to_string(),
            title: format!("Scenario {}", id),
            patient_summary: "67-year-old with chest pain".to_string(),
            recommendation: "Order a troponin panel".to_string(),
            updated_evidence: "Prior ECG shows ST depression".to_string(),
        }
    }

    #[test]
    fn test_scenario_set_rejects_empty() {
        assert!(ScenarioSet::new(vec![]).is_err());
    }

    #[test]
    fn test_scenario_set_rejects_duplicate_ids() {
        let result = ScenarioSet::new(vec![scenario("a"), scenario("a")]);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Duplicate"));
    }

    #[test]
    fn test_expected_responses_derived_from_len() {
        let set = ScenarioSet::new(vec![scenario("a"), scenario("b"), scenario("c")]).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.expected_responses(), 6);

        let set = ScenarioSet::new(vec![scenario("a")]).unwrap();
        assert_eq!(set.expected_responses(), 2);
    }

    #[test]
    fn test_trust_rating_bounds() {
        assert!(TrustRating::new(0).is_ok());
        assert!(TrustRating::new(100).is_ok());
        assert!(TrustRating::new(101).is_err());
        assert_eq!(TrustRating::default().value(), TrustRating::MIDPOINT);
    }

    #[test]
    fn test_follow_choice_parse() {
        assert_eq!(FollowChoice::parse("follow"), Some(FollowChoice::Follow));
        assert_eq!(FollowChoice::parse("Reject"), Some(FollowChoice::Reject));
        assert_eq!(FollowChoice::parse("maybe"), None);
    }

    #[test]
    fn test_response_serializes_camel_case() {
        let response = ScenarioResponse {
            scenario_id: "a".to_string(),
            phase: Phase::Initial,
            trust_rating: TrustRating::default(),
            follow_choice: FollowChoice::Follow,
            rationale: None,
            recorded_at: Utc::now(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["scenarioId"], "a");
        assert_eq!(json["phase"], "initial");
        assert_eq!(json["trustRating"], 50);
        assert_eq!(json["followChoice"], "follow");
        assert!(json.get("rationale").is_none());
    }
}

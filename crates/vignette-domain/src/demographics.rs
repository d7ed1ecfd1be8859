//! Demographics - the fixed pre-study field set

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The fixed demographic field names, in presentation order
///
/// Every field must be answered before the scenarios begin.
pub const DEMOGRAPHIC_FIELDS: &[&str] = &[
    "age",
    "gender",
    "education",
    "healthcare-role",
    "ai-experience",
];

/// Participant-entered demographic answers, keyed by field name
///
/// Populated once, before the scenarios; immutable afterward.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Demographics(BTreeMap<String, String>);

impl Demographics {
    /// Which of the fixed fields are absent or blank in the given answers
    ///
    /// Returns every missing field name, not just the first.
    pub fn missing_fields(answers: &BTreeMap<String, String>) -> Vec<&'static str> {
        DEMOGRAPHIC_FIELDS
            .iter()
            .filter(|field| {
                answers
                    .get(**field)
                    .map(|v| v.trim().is_empty())
                    .unwrap_or(true)
            })
            .copied()
            .collect()
    }

    /// Build a complete set of demographics from answers
    ///
    /// Returns an error naming every missing field.
    pub fn from_answers(answers: BTreeMap<String, String>) -> Result<Self, String> {
        let missing = Self::missing_fields(&answers);
        if !missing.is_empty() {
            return Err(format!("Missing demographic fields: {}", missing.join(", ")));
        }
        Ok(Self(answers))
    }

    /// Whether no answers have been recorded
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Look up a single answer by field name
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }
}

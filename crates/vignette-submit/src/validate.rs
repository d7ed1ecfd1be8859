//! Pre-submission record validation

use thiserror::Error;
use vignette_domain::StudyRecord;

/// One violated validation rule
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationIssue {
    /// The participant id is absent (nil)
    #[error("Participant id is missing")]
    MissingParticipantId,

    /// No demographic answers were recorded
    #[error("Demographics are empty")]
    EmptyDemographics,

    /// The response-entry count does not match the scenario set
    #[error("Expected {expected} scenario responses, found {actual}")]
    ScenarioCountMismatch {
        /// Two entries per configured scenario
        expected: usize,
        /// Entries actually present in the record
        actual: usize,
    },

    /// The closing questionnaire was never stored
    #[error("Questionnaire data is missing")]
    MissingQuestionnaire,
}

/// Outcome of validating a record against every rule
///
/// Carries every violation, not just the first, so a diagnostic message
/// can name all of them at once.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Every violated rule
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Whether the record passed every rule
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    /// Human-readable list of every violation
    pub fn messages(&self) -> Vec<String> {
        self.issues.iter().map(|i| i.to_string()).collect()
    }
}

impl std::fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_valid() {
            write!(f, "valid")
        } else {
            write!(f, "{}", self.messages().join(", "))
        }
    }
}

/// Validate a record for submission
///
/// A record is valid iff the participant id is present, demographics are
/// non-empty, the scenario-entry count equals exactly twice the
/// configured scenario count, and questionnaire data is present. The
/// expected count is derived from the scenario set the caller is
/// actually running, never from a constant.
pub fn validate(record: &StudyRecord, scenario_count: usize) -> ValidationReport {
    let mut issues = Vec::new();

    if record.participant_id().value() == 0 {
        issues.push(ValidationIssue::MissingParticipantId);
    }

    if record.demographics().is_empty() {
        issues.push(ValidationIssue::EmptyDemographics);
    }

    let expected = 2 * scenario_count;
    let actual = record.scenario_responses().len();
    if actual != expected {
        issues.push(ValidationIssue::ScenarioCountMismatch { expected, actual });
    }

    if record.questionnaire().is_none() {
        issues.push(ValidationIssue::MissingQuestionnaire);
    }

    ValidationReport { issues }
}

//! Error types for the flow controller

use crate::Step;
use thiserror::Error;

/// Validation and sequencing errors raised by the flow controller
///
/// Every variant is recoverable by re-prompting; none of them abort the
/// study or touch the network.
#[derive(Debug, Error)]
pub enum FlowError {
    /// One or more consent items were left unacknowledged
    #[error("Consent incomplete; unacknowledged: {}", unchecked.join(", "))]
    ConsentIncomplete {
        /// Every unacknowledged consent item
        unchecked: Vec<String>,
    },

    /// One or more demographic fields were left blank
    #[error("Missing demographic fields: {}", fields.join(", "))]
    MissingDemographics {
        /// Every missing field name
        fields: Vec<String>,
    },

    /// The mandatory follow choice was not made
    #[error("Please choose whether you would follow the recommendation")]
    ChoiceRequired,

    /// The questionnaire is incomplete
    #[error("Questionnaire incomplete: {}", problems.join("; "))]
    QuestionnaireIncomplete {
        /// Every unmet questionnaire requirement
        problems: Vec<String>,
    },

    /// The requested operation does not apply to the current step
    #[error("Operation not valid at step '{current}'")]
    WrongStep {
        /// The step the flow is actually on
        current: Step,
    },

    /// A record invariant was violated (set-once guard, etc.)
    #[error("Record error: {0}")]
    Record(String),
}

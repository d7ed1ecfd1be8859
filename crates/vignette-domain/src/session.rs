//! External-platform session metadata from the entry point

use serde::{Deserialize, Serialize};

/// Optional identifiers attached at initialization from the entry URL
///
/// Recruitment platforms pass these through query parameters; absence of
/// any of them is not an error. Immutable after initialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
    /// Platform-assigned participant id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform_participant_id: Option<String>,

    /// Platform study id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform_study_id: Option<String>,

    /// Platform session id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform_session_id: Option<String>,

    /// Post-completion redirect URL supplied by the platform
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_redirect: Option<String>,
}

impl SessionContext {
    /// Whether no platform metadata was supplied
    pub fn is_empty(&self) -> bool {
        self.platform_participant_id.is_none()
            && self.platform_study_id.is_none()
            && self.platform_session_id.is_none()
            && self.completion_redirect.is_none()
    }
}

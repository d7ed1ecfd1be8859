//! StudyRecord - one participant's complete response set

use crate::{
    Demographics, ParticipantId, Questionnaire, ScenarioResponse, SessionContext,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The complete set of one participant's responses and metadata
///
/// The record is owned by the flow controller for the whole session and
/// mutated only through the operations below. Timestamps and the
/// demographics/questionnaire sections are set once and never
/// overwritten; scenario responses are append-only in presentation
/// order. `completed` flips to true exactly once, when the closing
/// questionnaire is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyRecord {
    participant_id: ParticipantId,

    #[serde(flatten)]
    session: SessionContext,

    start_time: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    consent_time: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    end_time: Option<DateTime<Utc>>,

    demographics: Demographics,

    scenarios: Vec<ScenarioResponse>,

    #[serde(skip_serializing_if = "Option::is_none")]
    questionnaire: Option<Questionnaire>,

    completed: bool,
}

impl StudyRecord {
    /// Start a new record with a fresh participant id
    pub fn new(session: SessionContext) -> Self {
        Self::with_participant(ParticipantId::new(), session)
    }

    /// Start a new record with an explicit participant id
    pub fn with_participant(participant_id: ParticipantId, session: SessionContext) -> Self {
        Self {
            participant_id,
            session,
            start_time: Utc::now(),
            consent_time: None,
            end_time: None,
            demographics: Demographics::default(),
            scenarios: Vec::new(),
            questionnaire: None,
            completed: false,
        }
    }

    /// Stamp the consent time (once)
    pub fn record_consent(&mut self, at: DateTime<Utc>) -> Result<(), String> {
        if self.consent_time.is_some() {
            return Err("Consent time is already set".to_string());
        }
        self.consent_time = Some(at);
        Ok(())
    }

    /// Store the demographics section (once)
    pub fn set_demographics(&mut self, demographics: Demographics) -> Result<(), String> {
        if !self.demographics.is_empty() {
            return Err("Demographics are already set".to_string());
        }
        self.demographics = demographics;
        Ok(())
    }

    /// Append a scenario response entry
    pub fn push_response(&mut self, response: ScenarioResponse) -> Result<(), String> {
        if self.completed {
            return Err("Record is already completed".to_string());
        }
        self.scenarios.push(response);
        Ok(())
    }

    /// Remove and return the most recent response entry
    ///
    /// Used by backward navigation so a re-recorded answer replaces the
    /// superseded entry instead of duplicating it.
    pub fn pop_response(&mut self) -> Option<ScenarioResponse> {
        if self.completed {
            return None;
        }
        self.scenarios.pop()
    }

    /// Store the questionnaire, stamp the end time, and mark completion
    ///
    /// This is the single transition to the completed state; calling it
    /// again is an error.
    pub fn set_questionnaire(
        &mut self,
        questionnaire: Questionnaire,
        at: DateTime<Utc>,
    ) -> Result<(), String> {
        if self.completed {
            return Err("Record is already completed".to_string());
        }
        self.questionnaire = Some(questionnaire);
        self.end_time = Some(at);
        self.completed = true;
        Ok(())
    }

    /// The session's participant id
    pub fn participant_id(&self) -> ParticipantId {
        self.participant_id
    }

    /// External-platform session metadata
    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// When the session started
    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// When consent was recorded, if it has been
    pub fn consent_time(&self) -> Option<DateTime<Utc>> {
        self.consent_time
    }

    /// When the study ended, if it has
    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    /// The demographics section
    pub fn demographics(&self) -> &Demographics {
        &self.demographics
    }

    /// The recorded scenario responses, in presentation order
    pub fn scenario_responses(&self) -> &[ScenarioResponse] {
        &self.scenarios
    }

    /// The closing questionnaire, if stored
    pub fn questionnaire(&self) -> Option<&Questionnaire> {
        self.questionnaire.as_ref()
    }

    /// Whether the closing questionnaire has been validated and stored
    pub fn completed(&self) -> bool {
        self.completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FollowChoice, Phase, TrustChange, TrustRating};
    use std::collections::BTreeMap;

    fn demographics() -> Demographics {
        let answers: BTreeMap<String, String> = [
            ("age", "34"),
            ("gender", "female"),
            ("education", "ba"),
            ("healthcare-role", "none"),
            ("ai-experience", "some"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        Demographics::from_answers(answers).unwrap()
    }

    fn response(scenario_id: &str, phase: Phase) -> ScenarioResponse {
        ScenarioResponse {
            scenario_id: scenario_id.to_string(),
            phase,
            trust_rating: TrustRating::default(),
            follow_choice: FollowChoice::Follow,
            rationale: None,
            recorded_at: Utc::now(),
        }
    }

    fn questionnaire() -> Questionnaire {
        Questionnaire {
            trust_change: TrustChange::Increased,
            trust_factors: vec!["accuracy".to_string()],
            ai_opinion: "Helpful with oversight".to_string(),
            comments: None,
        }
    }

    #[test]
    fn test_consent_time_set_once() {
        let mut record = StudyRecord::new(SessionContext::default());
        assert!(record.record_consent(Utc::now()).is_ok());
        assert!(record.record_consent(Utc::now()).is_err());
    }

    #[test]
    fn test_demographics_set_once() {
        let mut record = StudyRecord::new(SessionContext::default());
        assert!(record.set_demographics(demographics()).is_ok());
        assert!(record.set_demographics(demographics()).is_err());
    }

    #[test]
    fn test_responses_append_in_order() {
        let mut record = StudyRecord::new(SessionContext::default());
        record.push_response(response("a", Phase::Initial)).unwrap();
        record.push_response(response("a", Phase::Updated)).unwrap();

        let entries = record.scenario_responses();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].phase, Phase::Initial);
        assert_eq!(entries[1].phase, Phase::Updated);
    }

    #[test]
    fn test_completion_is_terminal() {
        let mut record = StudyRecord::new(SessionContext::default());
        record.set_questionnaire(questionnaire(), Utc::now()).unwrap();

        assert!(record.completed());
        assert!(record.end_time().is_some());
        assert!(record.set_questionnaire(questionnaire(), Utc::now()).is_err());
        assert!(record.push_response(response("a", Phase::Initial)).is_err());
        assert!(record.pop_response().is_none());
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let mut record = StudyRecord::new(SessionContext {
            platform_participant_id: Some("5f8a".to_string()),
            ..Default::default()
        });
        record.record_consent(Utc::now()).unwrap();
        record.set_demographics(demographics()).unwrap();
        record.push_response(response("a", Phase::Initial)).unwrap();

        let json = serde_json::to_value(&record).unwrap();
        assert!(json["participantId"].is_string());
        assert!(json["startTime"].is_string());
        assert!(json["consentTime"].is_string());
        // Session metadata is flattened to the top level
        assert_eq!(json["platformParticipantId"], "5f8a");
        assert_eq!(json["completed"], false);
        assert_eq!(json["scenarios"].as_array().unwrap().len(), 1);
        assert!(json.get("endTime").is_none());
    }

    #[test]
    fn test_record_roundtrip() {
        let mut record = StudyRecord::new(SessionContext::default());
        record.record_consent(Utc::now()).unwrap();
        record.set_demographics(demographics()).unwrap();
        record.push_response(response("a", Phase::Initial)).unwrap();
        record.set_questionnaire(questionnaire(), Utc::now()).unwrap();

        let json = serde_json::to_string(&record).unwrap();
        let back: StudyRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, back);
    }
}

//! The study flow controller

use crate::{FlowError, Step};
use chrono::Utc;
use std::collections::BTreeMap;
use vignette_domain::{
    Demographics, FollowChoice, Phase, Questionnaire, Scenario, ScenarioResponse, ScenarioSet,
    SessionContext, StudyRecord, TrustChange, TrustRating,
};

/// The fixed consent checklist, in presentation order
///
/// Every item must be acknowledged before the study begins.
pub const CONSENT_ITEMS: &[&str] = &[
    "voluntary-participation",
    "data-use",
    "withdrawal-right",
    "age-confirmation",
];

/// Participant acknowledgements of the consent checklist
#[derive(Debug, Clone, Default)]
pub struct ConsentForm {
    acknowledged: Vec<String>,
}

impl ConsentForm {
    /// Start with nothing acknowledged
    pub fn new() -> Self {
        Self::default()
    }

    /// Acknowledge a single item
    pub fn acknowledge(&mut self, item: impl Into<String>) {
        let item = item.into();
        if !self.acknowledged.contains(&item) {
            self.acknowledged.push(item);
        }
    }

    /// Acknowledge every item on the checklist
    pub fn acknowledge_all() -> Self {
        let mut form = Self::new();
        for item in CONSENT_ITEMS {
            form.acknowledge(*item);
        }
        form
    }

    /// Which checklist items remain unacknowledged
    pub fn unchecked_items(&self) -> Vec<String> {
        CONSENT_ITEMS
            .iter()
            .filter(|item| !self.acknowledged.iter().any(|a| a == *item))
            .map(|item| item.to_string())
            .collect()
    }
}

/// View of the current scenario step, ready for rendering
///
/// The additional evidence is present only in the updated phase.
#[derive(Debug, Clone)]
pub struct ScenarioPrompt<'a> {
    /// The scenario on display
    pub scenario: &'a Scenario,

    /// Zero-based presentation index
    pub index: usize,

    /// Total number of scenarios
    pub total: usize,

    /// Which phase is on display
    pub phase: Phase,

    /// Additional evidence, revealed only in the updated phase
    pub evidence: Option<&'a str>,

    /// Pre-selected rating (the scale midpoint)
    pub default_rating: TrustRating,
}

/// Participant input for one scenario step
///
/// The follow choice is mandatory; leaving it unset is a validation
/// error. The rating defaults to the scale midpoint when not moved.
#[derive(Debug, Clone, Default)]
pub struct ScenarioInput {
    /// Trust rating (midpoint if untouched)
    pub rating: TrustRating,

    /// The mandatory follow selection; None means "not answered"
    pub choice: Option<FollowChoice>,

    /// Optional free-text rationale
    pub rationale: Option<String>,
}

/// Participant input for the closing questionnaire
#[derive(Debug, Clone, Default)]
pub struct QuestionnaireInput {
    /// Trust-change selection; None means "not answered"
    pub trust_change: Option<TrustChange>,

    /// Selected trust factors
    pub trust_factors: Vec<String>,

    /// Free-text opinion (required)
    pub ai_opinion: String,

    /// Optional closing comments
    pub comments: Option<String>,
}

/// Drives one participant through the study steps
///
/// Owns the in-memory StudyRecord for the whole session and is the only
/// writer to it. Each record operation validates step completeness first;
/// failures leave both the record and the current step untouched.
pub struct StudyFlow {
    record: StudyRecord,
    scenarios: ScenarioSet,
    step: Step,
}

impl StudyFlow {
    /// Start a new session at the consent step
    pub fn new(scenarios: ScenarioSet, session: SessionContext) -> Self {
        Self {
            record: StudyRecord::new(session),
            scenarios,
            step: Step::Consent,
        }
    }

    /// The current step
    pub fn step(&self) -> Step {
        self.step
    }

    /// The record collected so far
    pub fn record(&self) -> &StudyRecord {
        &self.record
    }

    /// The scenario definitions driving this session
    pub fn scenarios(&self) -> &ScenarioSet {
        &self.scenarios
    }

    /// Record consent and advance to demographics
    ///
    /// Requires every item of [`CONSENT_ITEMS`] to be acknowledged; on
    /// failure the error names each unacknowledged item and the step does
    /// not change.
    pub fn record_consent(&mut self, form: &ConsentForm) -> Result<(), FlowError> {
        if self.step != Step::Consent {
            return Err(FlowError::WrongStep { current: self.step });
        }

        let unchecked = form.unchecked_items();
        if !unchecked.is_empty() {
            return Err(FlowError::ConsentIncomplete { unchecked });
        }

        self.record
            .record_consent(Utc::now())
            .map_err(FlowError::Record)?;
        self.advance_to(Step::Demographics);
        Ok(())
    }

    /// Record demographics and advance to the first scenario
    ///
    /// Requires every field in the fixed field list to be non-empty; on
    /// failure the error lists which fields are missing.
    pub fn record_demographics(
        &mut self,
        answers: &BTreeMap<String, String>,
    ) -> Result<(), FlowError> {
        if self.step != Step::Demographics {
            return Err(FlowError::WrongStep { current: self.step });
        }

        let missing = Demographics::missing_fields(answers);
        if !missing.is_empty() {
            return Err(FlowError::MissingDemographics {
                fields: missing.iter().map(|f| f.to_string()).collect(),
            });
        }

        let demographics =
            Demographics::from_answers(answers.clone()).map_err(FlowError::Record)?;
        self.record
            .set_demographics(demographics)
            .map_err(FlowError::Record)?;
        self.advance_to(Step::first_scenario());
        Ok(())
    }

    /// The rendering view for the current scenario step
    pub fn present(&self) -> Result<ScenarioPrompt<'_>, FlowError> {
        let Step::Scenario { index, phase } = self.step else {
            return Err(FlowError::WrongStep { current: self.step });
        };

        // The step machine never points past the set
        let scenario = self
            .scenarios
            .get(index)
            .ok_or(FlowError::WrongStep { current: self.step })?;

        Ok(ScenarioPrompt {
            scenario,
            index,
            total: self.scenarios.len(),
            phase,
            evidence: match phase {
                Phase::Initial => None,
                Phase::Updated => Some(scenario.updated_evidence.as_str()),
            },
            default_rating: TrustRating::default(),
        })
    }

    /// Record the current scenario answer and advance
    ///
    /// Initial transitions to Updated on the same scenario; Updated
    /// transitions to the next scenario's Initial, or to the
    /// questionnaire once every scenario is exhausted.
    pub fn record_scenario_response(&mut self, input: ScenarioInput) -> Result<(), FlowError> {
        let Step::Scenario { index, phase } = self.step else {
            return Err(FlowError::WrongStep { current: self.step });
        };

        let choice = input.choice.ok_or(FlowError::ChoiceRequired)?;
        let scenario = self
            .scenarios
            .get(index)
            .ok_or(FlowError::WrongStep { current: self.step })?;

        self.record
            .push_response(ScenarioResponse {
                scenario_id: scenario.id.clone(),
                phase,
                trust_rating: input.rating,
                follow_choice: choice,
                rationale: input.rationale.filter(|r| !r.trim().is_empty()),
                recorded_at: Utc::now(),
            })
            .map_err(FlowError::Record)?;

        let next = self
            .step
            .next_scenario_step(self.scenarios.len())
            .expect("scenario step always has a successor");
        self.advance_to(next);
        Ok(())
    }

    /// Step back one scenario position
    ///
    /// Updated retreats to Initial on the same scenario; Initial retreats
    /// to the previous scenario's Updated. The superseded response entry
    /// is discarded so the re-recorded answer takes its place. A no-op at
    /// the very first position; returns whether a retreat happened.
    pub fn retreat_scenario(&mut self) -> bool {
        match self.step.previous_scenario_step() {
            Some(previous) => {
                self.record.pop_response();
                self.advance_to(previous);
                true
            }
            None => false,
        }
    }

    /// Record the closing questionnaire and complete the study
    ///
    /// Requires a trust-change selection, at least one trust factor, and
    /// a non-empty opinion; the error lists every unmet requirement. On
    /// success the record is stamped complete and the flow reaches its
    /// terminal step.
    pub fn record_questionnaire(&mut self, input: QuestionnaireInput) -> Result<(), FlowError> {
        if self.step != Step::Questionnaire {
            return Err(FlowError::WrongStep { current: self.step });
        }

        let mut problems = Vec::new();
        if input.trust_change.is_none() {
            problems.push("trust-change selection is required".to_string());
        }
        if input.trust_factors.is_empty() {
            problems.push("select at least one trust factor".to_string());
        }
        if input.ai_opinion.trim().is_empty() {
            problems.push("the opinion response is required".to_string());
        }
        if !problems.is_empty() {
            return Err(FlowError::QuestionnaireIncomplete { problems });
        }

        let questionnaire = Questionnaire {
            trust_change: input.trust_change.expect("checked above"),
            trust_factors: input.trust_factors,
            ai_opinion: input.ai_opinion,
            comments: input.comments.filter(|c| !c.trim().is_empty()),
        };
        self.record
            .set_questionnaire(questionnaire, Utc::now())
            .map_err(FlowError::Record)?;
        self.advance_to(Step::Complete);
        Ok(())
    }

    /// Hand the record over for submission
    ///
    /// The completion state travels with the record; the submission
    /// client's validation is the gate on an incomplete hand-off.
    pub fn into_record(self) -> StudyRecord {
        self.record
    }

    fn advance_to(&mut self, step: Step) {
        tracing::debug!(from = %self.step, to = %step, "step transition");
        self.step = step;
    }
}

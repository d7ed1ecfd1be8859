//! Step module - the explicit study-flow state machine

use vignette_domain::Phase;

/// Current position in the study flow
///
/// Traversal order: Consent → Demographics → (0, Initial) → (0, Updated)
/// → (1, Initial) → … → (N-1, Updated) → Questionnaire → Complete.
/// The scenario positions form a two-phase sweep over the scenario set;
/// the final Updated answer transitions to the questionnaire, never back
/// to a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Consent checklist
    Consent,

    /// Demographic fields
    Demographics,

    /// One scenario at one presentation phase
    Scenario {
        /// Presentation index into the scenario set
        index: usize,
        /// Which phase is on display
        phase: Phase,
    },

    /// Closing questionnaire
    Questionnaire,

    /// Study finished; the record is ready for submission
    Complete,
}

impl Step {
    /// The first scenario position
    pub fn first_scenario() -> Self {
        Step::Scenario {
            index: 0,
            phase: Phase::Initial,
        }
    }

    /// The scenario position after this one, given the scenario count
    ///
    /// Initial advances to Updated on the same scenario; Updated advances
    /// to the next scenario's Initial, or to the questionnaire once the
    /// set is exhausted. Returns None for non-scenario steps.
    pub fn next_scenario_step(&self, scenario_count: usize) -> Option<Step> {
        match self {
            Step::Scenario { index, phase } => match phase.next() {
                Some(next_phase) => Some(Step::Scenario {
                    index: *index,
                    phase: next_phase,
                }),
                None if index + 1 < scenario_count => Some(Step::Scenario {
                    index: index + 1,
                    phase: Phase::Initial,
                }),
                None => Some(Step::Questionnaire),
            },
            _ => None,
        }
    }

    /// The scenario position before this one
    ///
    /// Updated retreats to Initial on the same scenario; Initial retreats
    /// to the previous scenario's Updated. Returns None at the very first
    /// position and for non-scenario steps.
    pub fn previous_scenario_step(&self) -> Option<Step> {
        match self {
            Step::Scenario { index, phase } => match phase.previous() {
                Some(prev_phase) => Some(Step::Scenario {
                    index: *index,
                    phase: prev_phase,
                }),
                None if *index > 0 => Some(Step::Scenario {
                    index: index - 1,
                    phase: Phase::Updated,
                }),
                None => None,
            },
            _ => None,
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Step::Consent => write!(f, "consent"),
            Step::Demographics => write!(f, "demographics"),
            Step::Scenario { index, phase } => {
                write!(f, "scenario {} ({})", index + 1, phase.as_str())
            }
            Step::Questionnaire => write!(f, "questionnaire"),
            Step::Complete => write!(f, "complete"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_forward_sweep() {
        // Two scenarios: every initial precedes its updated, and the last
        // updated exits to the questionnaire.
        let mut step = Step::first_scenario();
        let mut visited = vec![step];
        while let Some(next) = step.next_scenario_step(2) {
            if next == Step::Questionnaire {
                break;
            }
            visited.push(next);
            step = next;
        }

        assert_eq!(
            visited,
            vec![
                Step::Scenario { index: 0, phase: Phase::Initial },
                Step::Scenario { index: 0, phase: Phase::Updated },
                Step::Scenario { index: 1, phase: Phase::Initial },
                Step::Scenario { index: 1, phase: Phase::Updated },
            ]
        );
        assert_eq!(step.next_scenario_step(2), Some(Step::Questionnaire));
    }

    #[test]
    fn test_backward_sweep() {
        let last = Step::Scenario { index: 1, phase: Phase::Initial };
        assert_eq!(
            last.previous_scenario_step(),
            Some(Step::Scenario { index: 0, phase: Phase::Updated })
        );

        let updated = Step::Scenario { index: 0, phase: Phase::Updated };
        assert_eq!(
            updated.previous_scenario_step(),
            Some(Step::Scenario { index: 0, phase: Phase::Initial })
        );

        // No-op at the very first position
        assert_eq!(Step::first_scenario().previous_scenario_step(), None);
    }

    #[test]
    fn test_non_scenario_steps_have_no_scenario_transitions() {
        assert_eq!(Step::Consent.next_scenario_step(3), None);
        assert_eq!(Step::Questionnaire.previous_scenario_step(), None);
    }
}

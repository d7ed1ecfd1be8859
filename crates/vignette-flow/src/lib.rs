//! Vignette Study Flow Controller
//!
//! Drives a participant through the ordered study steps (consent,
//! demographics, the two-phase scenario sequence, and the closing
//! questionnaire), collecting inputs into the StudyRecord and enforcing
//! per-step completeness before advancing.
//!
//! Every validation failure here is purely local: no network, no
//! persistence, and the current step does not change. The error lists
//! every violated item so the caller can re-prompt precisely.

#![warn(missing_docs)]

pub mod controller;
pub mod error;
pub mod step;

pub use controller::{
    ConsentForm, QuestionnaireInput, ScenarioInput, ScenarioPrompt, StudyFlow, CONSENT_ITEMS,
};
pub use error::FlowError;
pub use step::Step;

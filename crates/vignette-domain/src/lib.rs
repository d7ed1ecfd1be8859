//! Vignette Domain Layer
//!
//! This crate contains the core domain model for the Vignette study
//! instrument: one participant's responses and metadata for a single
//! session, plus the trait seams the infrastructure layers implement.
//!
//! ## Key Concepts
//!
//! - **StudyRecord**: the complete response set for one session, owned by
//!   the flow controller and mutated only through set-once operations
//! - **Phase**: the two presentation stages per scenario: initial
//!   recommendation, then updated evidence
//! - **ScenarioSet**: the ordered scenario definitions; the expected
//!   response count is always derived from this list
//! - **RecordStore**: the durable key-value capability used for queued
//!   submissions and local backups
//!
//! ## Architecture
//!
//! Infrastructure implementations (SQLite storage, HTTP submission) live
//! in other crates. This crate holds pure types, invariants, and trait
//! definitions only.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod demographics;
pub mod participant;
pub mod phase;
pub mod questionnaire;
pub mod record;
pub mod scenario;
pub mod session;
pub mod traits;

// Re-exports for convenience
pub use demographics::{Demographics, DEMOGRAPHIC_FIELDS};
pub use participant::ParticipantId;
pub use phase::Phase;
pub use questionnaire::{Questionnaire, TrustChange};
pub use record::StudyRecord;
pub use scenario::{FollowChoice, Scenario, ScenarioResponse, ScenarioSet, TrustRating};
pub use session::SessionContext;
pub use traits::{
    backup_key, queued_key, QueuedSubmission, RecordStore, BACKUP_KEY_PREFIX, QUEUED_KEY_PREFIX,
};

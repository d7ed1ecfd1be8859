//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and
//! infrastructure. Implementations live in other crates.

use crate::{ParticipantId, StudyRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Key prefix for queued submissions awaiting redelivery
pub const QUEUED_KEY_PREFIX: &str = "queuedStudyData_";

/// Key prefix for local backup snapshots
pub const BACKUP_KEY_PREFIX: &str = "studyData_";

/// Storage key for a participant's queued submission
pub fn queued_key(id: ParticipantId) -> String {
    format!("{}{}", QUEUED_KEY_PREFIX, id)
}

/// Storage key for a participant's local backup snapshot
pub fn backup_key(id: ParticipantId) -> String {
    format!("{}{}", BACKUP_KEY_PREFIX, id)
}

/// Durable local key-value storage capability
///
/// Values are JSON strings. Keys are participant-id scoped (see
/// [`queued_key`] and [`backup_key`]) so entries for different
/// participants never collide. Implemented by the infrastructure layer
/// (vignette-store).
pub trait RecordStore {
    /// Error type for store operations
    type Error;

    /// Read the value at a key, if present
    fn get(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Write (or overwrite) the value at a key
    fn put(&mut self, key: &str, value: &str) -> Result<(), Self::Error>;

    /// Delete the value at a key; deleting an absent key is not an error
    fn delete(&mut self, key: &str) -> Result<(), Self::Error>;

    /// List every key starting with the given prefix
    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, Self::Error>;
}

/// A StudyRecord snapshot persisted after exhausted submission retries
///
/// Created on exhausted retry, read back on flush, deleted on successful
/// resubmission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuedSubmission {
    /// The record awaiting delivery
    pub data: StudyRecord,

    /// When the record was first queued
    pub queue_time: DateTime<Utc>,

    /// Total delivery attempts made so far
    pub attempts: u32,
}

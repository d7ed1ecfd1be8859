//! Participant identity - one opaque id per study session

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a participant session, based on UUIDv7
///
/// UUIDv7 provides:
/// - A millisecond timestamp prefix, so ids sort by session start
/// - A random suffix, so collisions are vanishingly unlikely without
///   any coordination
/// - RFC 9562-standard format with broad ecosystem support
///
/// The id is generated once per session and never changes afterward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ParticipantId(u128);

impl ParticipantId {
    /// Generate a new UUIDv7-based ParticipantId
    ///
    /// # Examples
    ///
    /// ```
    /// use vignette_domain::ParticipantId;
    ///
    /// let id = ParticipantId::new();
    /// assert!(id.value() > 0);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create a ParticipantId from a raw u128 value
    ///
    /// This is primarily for storage layer deserialization.
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse a ParticipantId from its canonical UUID string
    ///
    /// # Examples
    ///
    /// ```
    /// use vignette_domain::ParticipantId;
    ///
    /// let id = ParticipantId::new();
    /// let parsed = ParticipantId::from_string(&id.to_string()).unwrap();
    /// assert_eq!(id, parsed);
    /// ```
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid participant id: {}", e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }

    /// Get the timestamp component (milliseconds since Unix epoch)
    pub fn timestamp(&self) -> u64 {
        // UUIDv7: top 48 bits are Unix millisecond timestamp
        (self.0 >> 80) as u64
    }
}

impl Default for ParticipantId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

impl TryFrom<String> for ParticipantId {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_string(&s)
    }
}

impl From<ParticipantId> for String {
    fn from(id: ParticipantId) -> Self {
        id.to_string()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: id ordering matches u128 ordering
        #[test]
        fn test_id_ordering_property(a: u128, b: u128) {
            let id_a = ParticipantId::from_value(a);
            let id_b = ParticipantId::from_value(b);

            prop_assert_eq!(id_a < id_b, a < b);
            prop_assert_eq!(id_a == id_b, a == b);
            prop_assert_eq!(id_a > id_b, a > b);
        }

        /// Property: round-trip through string representation preserves the id
        #[test]
        fn test_id_string_roundtrip(value: u128) {
            let id = ParticipantId::from_value(value);
            let id_str = id.to_string();

            match ParticipantId::from_string(&id_str) {
                Ok(parsed) => prop_assert_eq!(id, parsed),
                Err(e) => return Err(TestCaseError::fail(e)),
            }
        }

        /// Property: generated ids carry plausible timestamps
        #[test]
        fn test_id_timestamp_validity(_n in 0..10) {
            let id = ParticipantId::new();
            let timestamp = id.timestamp();

            // Timestamp should be reasonable (after 2020, before 2100)
            let min_timestamp = 1577836800000u64; // 2020-01-01
            let max_timestamp = 4102444800000u64; // 2100-01-01

            prop_assert!(timestamp >= min_timestamp && timestamp <= max_timestamp,
                "Timestamp {} out of reasonable range", timestamp);
        }
    }
}

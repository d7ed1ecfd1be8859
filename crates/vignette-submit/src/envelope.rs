//! Wire types for the submission endpoint

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vignette_domain::StudyRecord;

/// Action name for a data submission
pub const ACTION_SUBMIT: &str = "submitStudyData";

/// Action name for a connectivity probe
pub const ACTION_TEST: &str = "test";

/// Client environment metadata attached to every submission
///
/// The terminal analog of a browser user-agent block: enough for the
/// sink to tell which client build produced a row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientEnvironment {
    /// Client name
    pub client: String,

    /// Client version
    pub version: String,

    /// Operating system
    pub os: String,
}

impl Default for ClientEnvironment {
    fn default() -> Self {
        Self {
            client: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            os: std::env::consts::OS.to_string(),
        }
    }
}

/// The JSON envelope posted to the endpoint
///
/// `{action, data?, timestamp}`; probes carry no data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionEnvelope {
    /// Which endpoint action this request invokes
    pub action: String,

    /// The record payload (absent for probes)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    /// When the envelope was built
    pub timestamp: DateTime<Utc>,
}

impl SubmissionEnvelope {
    /// Build a data-submission envelope
    ///
    /// The payload is the record plus submission time and client
    /// environment metadata.
    pub fn submit(record: &StudyRecord) -> Result<Self, serde_json::Error> {
        let now = Utc::now();
        let mut data = serde_json::to_value(record)?;
        if let serde_json::Value::Object(ref mut map) = data {
            map.insert("submissionTime".to_string(), serde_json::to_value(now)?);
            map.insert(
                "environment".to_string(),
                serde_json::to_value(ClientEnvironment::default())?,
            );
        }
        Ok(Self {
            action: ACTION_SUBMIT.to_string(),
            data: Some(data),
            timestamp: now,
        })
    }

    /// Build a lightweight probe envelope
    pub fn probe() -> Self {
        Self {
            action: ACTION_TEST.to_string(),
            data: None,
            timestamp: Utc::now(),
        }
    }
}

/// Response body from the endpoint
///
/// `{success: true, rowsAdded?: n}` or `{success: false, error: "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SinkResponse {
    /// Whether the sink accepted the request
    pub success: bool,

    /// Error description on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Rows written on success, when the sink reports it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows_added: Option<u32>,

    /// HTTP status the response arrived with (transport-filled, not part
    /// of the body)
    #[serde(skip)]
    pub http_status: Option<u16>,
}

impl SinkResponse {
    /// A successful acceptance
    pub fn ok(rows_added: Option<u32>) -> Self {
        Self {
            success: true,
            error: None,
            rows_added,
            http_status: None,
        }
    }

    /// An application-level rejection
    pub fn rejected(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            rows_added: None,
            http_status: None,
        }
    }
}

//! The submission client: validate, transmit, retry, queue

use crate::config::SubmitConfig;
use crate::envelope::{SinkResponse, SubmissionEnvelope};
use crate::transport::{Transport, TransportError};
use crate::validate::{validate, ValidationReport};
use chrono::Utc;
use std::time::{Duration, Instant};
use thiserror::Error;
use vignette_domain::{backup_key, queued_key, QueuedSubmission, RecordStore, StudyRecord, QUEUED_KEY_PREFIX};

/// Errors that abort a submission before any delivery attempt
///
/// Transport failures never appear here: they are absorbed by the retry
/// loop and, at worst, end in the `Queued` outcome.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The record violates the submission rules and was not transmitted
    #[error("Record failed validation: {0}")]
    Invalid(ValidationReport),

    /// Durable storage failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// The record could not be encoded as JSON
    #[error("Encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// How a submission ended
///
/// `Queued` is a soft success: the data is safe in durable storage and
/// will be redelivered later. Callers must message it distinctly from
/// `Delivered` ("saved locally, will retry" vs "saved remotely").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The sink accepted the record
    Delivered {
        /// Rows written, when the sink reports it
        rows_added: Option<u32>,
    },

    /// Retries exhausted; the record is queued locally
    Queued,
}

/// Result of a connectivity probe
#[derive(Debug, Clone)]
pub struct ConnectionProbe {
    /// Whether the endpoint answered with acceptance
    pub success: bool,

    /// Measured round-trip latency
    pub latency: Duration,

    /// HTTP status of the response, when one arrived
    pub http_status: Option<u16>,

    /// Error description on failure
    pub error: Option<String>,
}

/// Result of a queue flush pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Queued entries a delivery was attempted for
    pub attempted: usize,

    /// Entries delivered and removed from storage
    pub delivered: usize,

    /// Entries that failed again and stay queued
    pub remaining: usize,

    /// Entries skipped because their stored JSON would not parse
    pub skipped_malformed: usize,
}

/// Validates, transmits, retries, and queues study records
///
/// Owns a transport and a durable store. All delivery is sequential: at
/// most one outbound request is in flight at a time, and queued entries
/// flush one by one so the same participant is never submitted twice
/// concurrently.
pub struct SubmissionClient<T: Transport, S: RecordStore> {
    transport: T,
    store: S,
    scenario_count: usize,
    config: SubmitConfig,
}

impl<T, S> SubmissionClient<T, S>
where
    T: Transport,
    S: RecordStore,
    S::Error: std::fmt::Display,
{
    /// Create a client for a study with the given scenario count
    ///
    /// The expected response count is derived from the scenario set the
    /// session actually ran, so validation follows the list wherever it
    /// is configured.
    pub fn new(transport: T, store: S, scenario_count: usize) -> Self {
        Self {
            transport,
            store,
            scenario_count,
            config: SubmitConfig::default(),
        }
    }

    /// Replace the retry/timing configuration
    pub fn with_config(mut self, config: SubmitConfig) -> Self {
        self.config = config;
        self
    }

    /// The active configuration
    pub fn config(&self) -> &SubmitConfig {
        &self.config
    }

    /// The underlying store (for inspection)
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Submit a completed record
    ///
    /// Validates first (an invalid record is never transmitted), writes
    /// the local backup snapshot, then attempts delivery with bounded
    /// sequential retry. Exhausted retries queue the record durably and
    /// report [`SubmitOutcome::Queued`]; data is safe either way.
    pub async fn submit(&mut self, record: &StudyRecord) -> Result<SubmitOutcome, SubmitError> {
        let report = validate(record, self.scenario_count);
        if !report.is_valid() {
            return Err(SubmitError::Invalid(report));
        }

        // Local backup regardless of what the network does
        let snapshot = serde_json::to_string(record)?;
        self.store
            .put(&backup_key(record.participant_id()), &snapshot)
            .map_err(|e| SubmitError::Storage(e.to_string()))?;

        let envelope = SubmissionEnvelope::submit(record)?;
        match self.attempt_delivery(&envelope).await {
            Ok(response) => {
                // A previously queued copy is now obsolete
                let key = queued_key(record.participant_id());
                if self
                    .store
                    .get(&key)
                    .map_err(|e| SubmitError::Storage(e.to_string()))?
                    .is_some()
                {
                    self.store
                        .delete(&key)
                        .map_err(|e| SubmitError::Storage(e.to_string()))?;
                    tracing::info!(participant = %record.participant_id(), "removed queued copy after delivery");
                }
                Ok(SubmitOutcome::Delivered {
                    rows_added: response.rows_added,
                })
            }
            Err(last_error) => {
                let queued = QueuedSubmission {
                    data: record.clone(),
                    queue_time: Utc::now(),
                    attempts: 1 + self.config.max_retries,
                };
                let json = serde_json::to_string(&queued)?;
                self.store
                    .put(&queued_key(record.participant_id()), &json)
                    .map_err(|e| SubmitError::Storage(e.to_string()))?;
                tracing::warn!(
                    participant = %record.participant_id(),
                    "retries exhausted, record queued locally: {}", last_error
                );
                Ok(SubmitOutcome::Queued)
            }
        }
    }

    /// Probe the endpoint and measure round-trip latency
    ///
    /// Pre-flight only: a failed probe does not gate submission.
    pub async fn test_connection(&self) -> ConnectionProbe {
        let envelope = SubmissionEnvelope::probe();
        let started = Instant::now();
        let result = self.transport.post(&envelope).await;
        let latency = started.elapsed();

        match result {
            Ok(response) => ConnectionProbe {
                success: response.success,
                latency,
                http_status: response.http_status,
                error: response.error,
            },
            Err(TransportError::Http { status, body }) => ConnectionProbe {
                success: false,
                latency,
                http_status: Some(status),
                error: Some(body),
            },
            Err(e) => ConnectionProbe {
                success: false,
                latency,
                http_status: None,
                error: Some(e.to_string()),
            },
        }
    }

    /// Attempt delivery for every queued submission
    ///
    /// Entries are processed one at a time with the same retry policy as
    /// [`submit`](Self::submit). Delivered entries are removed; failed
    /// ones stay queued with their attempt counter advanced. A malformed
    /// entry is logged and skipped without blocking the others. With
    /// nothing queued, no network request is made.
    pub async fn flush_queued(&mut self) -> Result<FlushReport, SubmitError> {
        let keys = self
            .store
            .keys_with_prefix(QUEUED_KEY_PREFIX)
            .map_err(|e| SubmitError::Storage(e.to_string()))?;

        let mut report = FlushReport::default();
        if keys.is_empty() {
            tracing::debug!("no queued submissions to flush");
            return Ok(report);
        }

        for key in keys {
            let Some(value) = self
                .store
                .get(&key)
                .map_err(|e| SubmitError::Storage(e.to_string()))?
            else {
                continue;
            };

            let mut queued: QueuedSubmission = match serde_json::from_str(&value) {
                Ok(q) => q,
                Err(e) => {
                    tracing::error!(key = %key, "skipping malformed queued entry: {}", e);
                    report.skipped_malformed += 1;
                    continue;
                }
            };

            report.attempted += 1;
            let envelope = SubmissionEnvelope::submit(&queued.data)?;
            match self.attempt_delivery(&envelope).await {
                Ok(_) => {
                    self.store
                        .delete(&key)
                        .map_err(|e| SubmitError::Storage(e.to_string()))?;
                    report.delivered += 1;
                    tracing::info!(key = %key, "queued submission delivered");
                }
                Err(last_error) => {
                    queued.attempts += 1 + self.config.max_retries;
                    let json = serde_json::to_string(&queued)?;
                    self.store
                        .put(&key, &json)
                        .map_err(|e| SubmitError::Storage(e.to_string()))?;
                    report.remaining += 1;
                    tracing::warn!(key = %key, "queued submission still undeliverable: {}", last_error);
                }
            }
        }

        Ok(report)
    }

    /// One bounded sequence of delivery attempts
    ///
    /// Makes `1 + max_retries` full requests, sequentially, with the
    /// configured fixed delay between them. Any transport error,
    /// non-success status, or `{success:false}` body counts as a failed
    /// attempt. Returns the final failure text when every attempt fails.
    async fn attempt_delivery(&self, envelope: &SubmissionEnvelope) -> Result<SinkResponse, String> {
        let total_attempts = 1 + self.config.max_retries;
        let mut last_error = String::new();

        for attempt in 1..=total_attempts {
            match self.transport.post(envelope).await {
                Ok(response) if response.success => {
                    tracing::debug!(attempt, "submission accepted");
                    return Ok(response);
                }
                Ok(response) => {
                    last_error = response
                        .error
                        .unwrap_or_else(|| "Sink reported failure".to_string());
                }
                Err(e) => {
                    last_error = e.to_string();
                }
            }

            tracing::warn!(attempt, total_attempts, "submission attempt failed: {}", last_error);
            if attempt < total_attempts {
                tokio::time::sleep(self.config.retry_delay()).await;
            }
        }

        Err(last_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;
    use chrono::Utc;
    use std::collections::BTreeMap;
    use vignette_domain::{
        Demographics, FollowChoice, Phase, Questionnaire, ScenarioResponse, SessionContext,
        TrustChange, TrustRating,
    };
    use vignette_store::MemoryStore;

    const SCENARIOS: usize = 2;

    fn create_complete_record() -> StudyRecord {
        let mut record = StudyRecord::new(SessionContext::default());

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
        record
            .set_demographics(Demographics::from_answers(answers).unwrap())
            .unwrap();

        for i in 0..SCENARIOS {
            for phase in [Phase::Initial, Phase::Updated] {
                record
                    .push_response(ScenarioResponse {
                        scenario_id: format!("s{}", i),
                        phase,
                        trust_rating: TrustRating::default(),
                        follow_choice: FollowChoice::Follow,
                        rationale: None,
                        recorded_at: Utc::now(),
                    })
                    .unwrap();
            }
        }

        record
            .set_questionnaire(
                Questionnaire {
                    trust_change: TrustChange::Increased,
                    trust_factors: vec!["evidence".to_string()],
                    ai_opinion: "Trust follows transparency".to_string(),
                    comments: None,
                },
                Utc::now(),
            )
            .unwrap();

        record
    }

    fn fast_config() -> SubmitConfig {
        SubmitConfig {
            retry_delay_ms: 0,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_always_rejecting_sink_queues_after_all_attempts() {
        let transport = MockTransport::always_rejecting();
        let store = MemoryStore::new();
        let mut client = SubmissionClient::new(transport.clone(), store.clone(), SCENARIOS)
            .with_config(fast_config());

        let record = create_complete_record();
        let outcome = client.submit(&record).await.unwrap();

        assert_eq!(outcome, SubmitOutcome::Queued);
        // Exactly max_retries + 1 outbound attempts
        assert_eq!(transport.call_count(), 4);

        // The record is persisted under the queued key, attempts recorded
        let queued_json = store.get(&queued_key(record.participant_id())).unwrap().unwrap();
        let queued: QueuedSubmission = serde_json::from_str(&queued_json).unwrap();
        assert_eq!(queued.attempts, 4);
        assert_eq!(queued.data, record);

        // The backup snapshot is written regardless of the outcome
        assert!(store.get(&backup_key(record.participant_id())).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_success_on_second_attempt_does_not_queue() {
        let transport = MockTransport::new();
        transport.push_outcome(Err(TransportError::Network("connection reset".to_string())));
        // Second attempt hits the default acceptance

        let store = MemoryStore::new();
        let mut client = SubmissionClient::new(transport.clone(), store.clone(), SCENARIOS)
            .with_config(fast_config());

        let record = create_complete_record();
        let outcome = client.submit(&record).await.unwrap();

        assert_eq!(outcome, SubmitOutcome::Delivered { rows_added: Some(1) });
        assert_eq!(transport.call_count(), 2);
        assert!(store.get(&queued_key(record.participant_id())).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delivery_removes_prior_queued_copy() {
        let transport = MockTransport::new();
        let mut store = MemoryStore::new();
        let record = create_complete_record();

        // A stale queued copy from an earlier offline run
        let stale = QueuedSubmission {
            data: record.clone(),
            queue_time: Utc::now(),
            attempts: 4,
        };
        store
            .put(&queued_key(record.participant_id()), &serde_json::to_string(&stale).unwrap())
            .unwrap();

        let mut client = SubmissionClient::new(transport, store.clone(), SCENARIOS)
            .with_config(fast_config());
        let outcome = client.submit(&record).await.unwrap();

        assert!(matches!(outcome, SubmitOutcome::Delivered { .. }));
        assert!(store.get(&queued_key(record.participant_id())).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_invalid_record_is_never_transmitted() {
        let transport = MockTransport::new();
        let store = MemoryStore::new();
        let mut client = SubmissionClient::new(transport.clone(), store.clone(), SCENARIOS)
            .with_config(fast_config());

        // Fresh record: no demographics, no responses, no questionnaire
        let record = StudyRecord::new(SessionContext::default());
        let err = client.submit(&record).await.unwrap_err();

        match err {
            SubmitError::Invalid(report) => assert_eq!(report.issues.len(), 3),
            other => panic!("Expected Invalid, got {:?}", other),
        }
        assert_eq!(transport.call_count(), 0);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_flush_removes_only_delivered_entries() {
        let transport = MockTransport::always_rejecting();
        // First processed entry succeeds on its single attempt; the
        // second falls through to the rejecting default
        transport.push_outcome(Ok(SinkResponse::ok(None)));

        let mut store = MemoryStore::new();
        for _ in 0..2 {
            let record = create_complete_record();
            let queued = QueuedSubmission {
                data: record.clone(),
                queue_time: Utc::now(),
                attempts: 4,
            };
            store
                .put(&queued_key(record.participant_id()), &serde_json::to_string(&queued).unwrap())
                .unwrap();
        }

        let config = SubmitConfig {
            max_retries: 0,
            retry_delay_ms: 0,
            ..Default::default()
        };
        let mut client =
            SubmissionClient::new(transport, store.clone(), SCENARIOS).with_config(config);
        let report = client.flush_queued().await.unwrap();

        assert_eq!(report.attempted, 2);
        assert_eq!(report.delivered, 1);
        assert_eq!(report.remaining, 1);

        // Exactly one entry left, its attempt counter advanced
        let keys = store.keys_with_prefix(QUEUED_KEY_PREFIX).unwrap();
        assert_eq!(keys.len(), 1);
        let queued: QueuedSubmission =
            serde_json::from_str(&store.get(&keys[0]).unwrap().unwrap()).unwrap();
        assert_eq!(queued.attempts, 5);
    }

    #[tokio::test]
    async fn test_flush_with_empty_queue_makes_no_requests() {
        let transport = MockTransport::new();
        let store = MemoryStore::new();
        let mut client = SubmissionClient::new(transport.clone(), store.clone(), SCENARIOS)
            .with_config(fast_config());

        let report = client.flush_queued().await.unwrap();

        assert_eq!(report, FlushReport::default());
        assert_eq!(transport.call_count(), 0);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_flush_skips_malformed_entry_and_processes_rest() {
        let transport = MockTransport::new();
        let mut store = MemoryStore::new();

        store.put("queuedStudyData_garbage", "{not json").unwrap();
        let record = create_complete_record();
        let queued = QueuedSubmission {
            data: record.clone(),
            queue_time: Utc::now(),
            attempts: 4,
        };
        store
            .put(&queued_key(record.participant_id()), &serde_json::to_string(&queued).unwrap())
            .unwrap();

        let mut client = SubmissionClient::new(transport, store.clone(), SCENARIOS)
            .with_config(fast_config());
        let report = client.flush_queued().await.unwrap();

        assert_eq!(report.skipped_malformed, 1);
        assert_eq!(report.delivered, 1);
        // The malformed entry stays put; the delivered one is gone
        assert!(store.get("queuedStudyData_garbage").unwrap().is_some());
        assert!(store.get(&queued_key(record.participant_id())).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_probe_reports_latency_and_failure() {
        let transport = MockTransport::new();
        let store = MemoryStore::new();
        let client = SubmissionClient::new(transport.clone(), store, SCENARIOS);

        let probe = client.test_connection().await;
        assert!(probe.success);
        assert!(probe.error.is_none());

        transport.push_outcome(Err(TransportError::Http {
            status: 503,
            body: "unavailable".to_string(),
        }));
        let probe = client.test_connection().await;
        assert!(!probe.success);
        assert_eq!(probe.http_status, Some(503));
        assert_eq!(probe.error.as_deref(), Some("unavailable"));
    }
}

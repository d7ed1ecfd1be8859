//! Transport seam between the client and the wire

use crate::envelope::{SinkResponse, SubmissionEnvelope};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

/// Default timeout for a single submission request (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Errors raised by a transport
#[derive(Error, Debug, Clone)]
pub enum TransportError {
    /// The endpoint answered with a non-success HTTP status
    #[error("HTTP {status}: {body}")]
    Http {
        /// The status code
        status: u16,
        /// Response body text, as far as it could be read
        body: String,
    },

    /// The request never completed (connection refused, DNS, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// The endpoint answered with a body the client cannot parse
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() {
            TransportError::Network(e.to_string())
        } else if e.is_decode() {
            TransportError::InvalidResponse(e.to_string())
        } else {
            TransportError::Network(e.to_string())
        }
    }
}

/// A way to deliver envelopes to the sink
///
/// `HttpTransport` is the real implementation; `MockTransport` replays
/// scripted outcomes for tests and development.
pub trait Transport {
    /// Post one envelope and return the sink's parsed response
    fn post(
        &self,
        envelope: &SubmissionEnvelope,
    ) -> impl std::future::Future<Output = Result<SinkResponse, TransportError>> + Send;
}

/// HTTP transport over reqwest
///
/// Posts the JSON envelope to the configured endpoint. Any non-success
/// status is an error; the response body is parsed as a [`SinkResponse`].
pub struct HttpTransport {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport for the given endpoint URL
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use vignette_submit::HttpTransport;
    ///
    /// let transport = HttpTransport::new("https://sink.example.org/exec");
    /// ```
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_timeout(endpoint, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a transport with an explicit request timeout
    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap();

        Self {
            endpoint: endpoint.into(),
            client,
        }
    }

    /// The configured endpoint URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Transport for HttpTransport {
    async fn post(&self, envelope: &SubmissionEnvelope) -> Result<SinkResponse, TransportError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(envelope)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(TransportError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let mut parsed: SinkResponse = response
            .json()
            .await
            .map_err(|e| TransportError::InvalidResponse(format!("Failed to parse response: {}", e)))?;
        parsed.http_status = Some(status.as_u16());
        Ok(parsed)
    }
}

/// Scripted transport for deterministic testing
///
/// Outcomes are consumed front-to-back; once the script is exhausted the
/// default outcome repeats. The default default is acceptance.
///
/// # Examples
///
/// ```
/// use vignette_submit::{MockTransport, SinkResponse};
///
/// let transport = MockTransport::new();
/// transport.push_outcome(Err(vignette_submit::TransportError::Network("down".into())));
/// transport.push_outcome(Ok(SinkResponse::ok(Some(1))));
/// assert_eq!(transport.call_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MockTransport {
    script: Arc<Mutex<VecDeque<Result<SinkResponse, TransportError>>>>,
    default_outcome: Result<SinkResponse, TransportError>,
    call_count: Arc<Mutex<usize>>,
}

impl MockTransport {
    /// Create a transport whose default outcome is acceptance
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            default_outcome: Ok(SinkResponse::ok(Some(1))),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Create a transport that rejects every request at the application
    /// level (`{success:false}`)
    pub fn always_rejecting() -> Self {
        Self {
            default_outcome: Ok(SinkResponse::rejected("rejected by sink")),
            ..Self::new()
        }
    }

    /// Create a transport that fails every request at the network level
    pub fn always_unreachable() -> Self {
        Self {
            default_outcome: Err(TransportError::Network("connection refused".to_string())),
            ..Self::new()
        }
    }

    /// Queue one scripted outcome
    pub fn push_outcome(&self, outcome: Result<SinkResponse, TransportError>) {
        self.script.lock().unwrap().push_back(outcome);
    }

    /// Number of post calls made so far
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for MockTransport {
    async fn post(&self, _envelope: &SubmissionEnvelope) -> Result<SinkResponse, TransportError> {
        *self.call_count.lock().unwrap() += 1;
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.default_outcome.clone())
    }
}

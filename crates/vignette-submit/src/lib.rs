//! Vignette Submission Client
//!
//! Validates a completed StudyRecord, transmits it to the remote
//! spreadsheet-backed sink, retries on transient failure, and falls back
//! to durable local queuing when retries are exhausted. The guarantee
//! this crate exists to uphold: a participant's data is never silently
//! lost. Every failure path ends in either a successful remote write or
//! a durable local write.
//!
//! # Architecture
//!
//! The wire boundary is the [`Transport`] trait. `HttpTransport` posts
//! JSON envelopes with reqwest; `MockTransport` replays scripted
//! outcomes for tests and development without any network.
//!
//! # Outcomes
//!
//! [`client::SubmitOutcome::Queued`] is a soft success, not a failure:
//! the record is safe in durable storage and will be redelivered by
//! [`client::SubmissionClient::flush_queued`], which runs on
//! connectivity restore and once at application start.

#![warn(missing_docs)]

pub mod client;
pub mod config;
pub mod envelope;
pub mod monitor;
pub mod transport;
pub mod validate;

pub use client::{ConnectionProbe, FlushReport, SubmissionClient, SubmitError, SubmitOutcome};
pub use config::SubmitConfig;
pub use envelope::{ClientEnvironment, SinkResponse, SubmissionEnvelope};
pub use monitor::ConnectivityMonitor;
pub use transport::{HttpTransport, MockTransport, Transport, TransportError};
pub use validate::{validate, ValidationIssue, ValidationReport};

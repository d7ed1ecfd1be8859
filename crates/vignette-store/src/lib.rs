//! Vignette Storage Layer
//!
//! Implements the RecordStore capability over SQLite, plus an in-memory
//! store for tests and development.
//!
//! # Architecture
//!
//! The store is a plain key-value table: queued submissions live under
//! `queuedStudyData_<participantId>` and local backup snapshots under
//! `studyData_<participantId>`, both as JSON strings. Everything is
//! single-threaded and foreground, so no locking beyond SQLite's own is
//! needed.
//!
//! # Examples
//!
//! ```no_run
//! use vignette_store::SqliteStore;
//!
//! let store = SqliteStore::new("vignette.db").unwrap();
//! // Store is now ready for queue and backup operations
//! ```

#![warn(missing_docs)]

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// I/O error creating the store location
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

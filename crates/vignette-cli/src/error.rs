//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Flow error that was not recoverable by re-prompting
    #[error("Flow error: {0}")]
    Flow(#[from] vignette_flow::FlowError),

    /// Submission error
    #[error("Submission error: {0}")]
    Submit(#[from] vignette_submit::SubmitError),

    /// Storage error
    #[error("Storage error: {0}")]
    Store(#[from] vignette_store::StoreError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Line-input error (including end-of-input)
    #[error("Input error: {0}")]
    Input(#[from] rustyline::error::ReadlineError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Entry URL could not be parsed
    #[error("Invalid entry URL: {0}")]
    EntryUrl(#[from] url::ParseError),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

//! Vignette CLI - terminal front end for the Vignette study instrument.

pub mod cli;
pub mod config;
pub mod entry;
pub mod error;
pub mod study;

pub use cli::{Cli, Command};
pub use config::StudyConfig;
pub use error::{CliError, Result};

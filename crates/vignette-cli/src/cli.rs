//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Vignette - a two-phase clinical-decision study instrument.
#[derive(Debug, Parser)]
#[command(name = "vignette")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the study interactively
    Run(RunArgs),

    /// Attempt delivery of locally queued submissions
    Flush,

    /// Probe the submission endpoint and report latency
    Probe,
}

/// Arguments for the run command.
#[derive(Debug, Parser)]
pub struct RunArgs {
    /// Entry URL carrying platform identifiers and an optional redirect
    /// (e.g. "https://study.example.org/?PROLIFIC_PID=..&STUDY_ID=..")
    #[arg(long, env = "VIGNETTE_ENTRY_URL")]
    pub entry_url: Option<String>,

    /// Skip the pre-flight connection probe
    #[arg(long)]
    pub skip_probe: bool,
}

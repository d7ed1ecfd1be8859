//! Vignette CLI - runs the two-phase clinical-decision study in a terminal.

use clap::Parser;
use vignette_cli::{entry, study, Cli, Command, StudyConfig};
use vignette_domain::SessionContext;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> vignette_cli::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if cli.no_color {
        colored::control::set_override(false);
    }

    // Load config from the given path, or the default location; first
    // run writes the defaults out so they can be edited
    let config = match &cli.config {
        Some(path) => StudyConfig::load_from(path)?,
        None => StudyConfig::load().unwrap_or_else(|_| {
            let cfg = StudyConfig::default();
            if let Ok(path) = StudyConfig::path() {
                cfg.save_to(&path).ok();
            }
            cfg
        }),
    };

    match cli.command {
        Command::Run(args) => {
            let session = match &args.entry_url {
                Some(url) => entry::parse_entry_url(url)?,
                None => SessionContext::default(),
            };
            study::run_study(&config, session, args.skip_probe).await?;
        }
        Command::Flush => study::flush(&config).await?,
        Command::Probe => study::probe(&config).await?,
    }

    Ok(())
}

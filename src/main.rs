//! Quilt - a static HTML composition tool built around include directives.

mod assets;
mod build;
mod cli;
mod config;
mod include;
mod logger;
mod pages;
mod report;
mod serve;
mod utils;
mod watch;

use anyhow::{Context, Result};
use build::build_site;
use clap::Parser;
use cli::{Cli, Commands};
use config::{SiteConfig, cfg, init_config};
use serve::serve_site;
use watch::watch_for_changes_blocking;

fn main() -> Result<()> {
    let cli: &'static Cli = Box::leak(Box::new(Cli::parse()));
    init_config(SiteConfig::load(cli)?);

    match &cli.command {
        Commands::Build { .. } => build_all(&cfg()),
        Commands::Watch { .. } => {
            build_all(&cfg())?;
            watch_for_changes_blocking()
        }
        Commands::Serve { .. } => {
            build_all(&cfg())?;
            serve_site()
        }
    }
}

/// Build the site once and log its report.
fn build_all(config: &SiteConfig) -> Result<()> {
    let report = build_site(config).context("build failed")?;
    report.log_summary();
    Ok(())
}

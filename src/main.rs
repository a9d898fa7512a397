//! livepatch - A headless live-reload client for development servers.

mod cli;
mod config;
mod core;
mod dom;
mod logger;
mod reconcile;
mod reload;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::LiveConfig;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = LiveConfig::load(&cli)?;
    if let Some(path) = &config.config_path {
        log!("config"; "loaded {}", path.display());
    }

    match &cli.command {
        Commands::Watch { .. } => cli::watch::run_watch(&config),
        Commands::Hub { .. } => cli::hub::run_hub(&config),
    }
}

mod cli;
mod commands;
mod config;
mod error;

use std::process;

use clap::Parser;
use tracing::{Level, debug, error};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};
use ttv_playlist::ProcessRestarter;

use crate::{
    cli::{Args, Commands},
    commands::CommandExecutor,
    config::AppConfig,
    error::{AppError, Result},
};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = run(args).await {
        error!("Application error: {}", e);
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    // Captured before anything else so a relaunch sees the original arguments.
    let restarter = ProcessRestarter::from_current_process()?;

    init_logging(args.verbose, args.quiet)?;

    let mut config = AppConfig::load(args.config.as_deref())?;
    config.apply_args(&args);
    debug!(proxies = ?config.proxy.endpoints(), ads = ?config.ads, "Loaded configuration");

    let executor = CommandExecutor::new(config, restarter)?;

    match args.command {
        Commands::Streams { channel, json } => executor.streams(&channel, json).await,
        Commands::Watch {
            channel,
            quality,
            max_refreshes,
        } => executor.watch(&channel, &quality, max_refreshes).await,
    }
}

fn init_logging(verbose: bool, quiet: bool) -> Result<()> {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(verbose),
        )
        .try_init()
        .map_err(|e| AppError::Logging(e.to_string()))
}

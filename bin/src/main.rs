//! xetl CLI - Incremental Xetra daily report pipeline.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod display;
mod logging;

#[derive(Parser)]
#[command(name = "xetl")]
#[command(about = "Incremental Xetra trade extraction and daily OHLCV reporting", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (warnings and errors only)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline once
    Run {
        /// Config file. Defaults to $XETL_CONFIG, then the user config directory.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Compute and log everything but persist neither report nor watermark
        #[arg(long)]
        dry_run: bool,
    },

    /// Show which partitions the next run would read
    Plan {
        /// Config file. Defaults to $XETL_CONFIG, then the user config directory.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the watermark rows
    Meta {
        /// Config file. Defaults to $XETL_CONFIG, then the user config directory.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Show help if no command provided
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let config_path = match &command {
        Commands::Run { config, .. } | Commands::Plan { config, .. } | Commands::Meta { config } => {
            config.clone()
        }
    };
    let config = config::load(config_path)?;
    logging::init(&config.logging, cli.verbose, cli.quiet)?;

    match command {
        Commands::Run { dry_run, .. } => commands::run::run(config, dry_run, cli.quiet).await,
        Commands::Plan { json, .. } => commands::plan::plan(config, json).await,
        Commands::Meta { .. } => commands::meta::meta(config).await,
    }
}

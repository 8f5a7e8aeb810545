//! TileVault CLI - Command-line interface
//!
//! This binary provides the command-line interface to the TileVault
//! library: budgeted tile syncs, dry-run planning, region listing, and
//! cache maintenance.

mod commands;
mod error;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use tilevault::config::ConfigFile;
use tilevault::logging::{default_log_dir, init_logging};

use commands::cache::CacheAction;
use commands::plan::PlanArgs;
use commands::sync::SyncArgs;
use error::CliError;

#[derive(Debug, Parser)]
#[command(
    name = "tilevault",
    version,
    about = "Bulk map tile downloader with a storage budget"
)]
struct Cli {
    /// Path to an alternate config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Download tiles for the configured regions
    Sync(SyncArgs),

    /// Show how many tiles a sync would attempt, per zoom level
    Plan(PlanArgs),

    /// List the regions in the catalog
    Regions,

    /// Tile cache maintenance
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

fn main() {
    let cli = Cli::parse();

    let _logging_guard = match init_logging(&default_log_dir()) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("warning: logging unavailable: {}", e);
            None
        }
    };

    if let Err(e) = run(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config_file = match &cli.config {
        Some(path) => ConfigFile::load_from(path)?,
        None => ConfigFile::load()?,
    };

    match cli.command {
        Command::Sync(args) => commands::sync::run(&config_file, args),
        Command::Plan(args) => commands::plan::run(&config_file, args),
        Command::Regions => commands::regions::run(&config_file),
        Command::Cache { action } => commands::cache::run(&config_file, action),
    }
}

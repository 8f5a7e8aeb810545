//! The `sync` command: run a budgeted tile download.

use std::path::PathBuf;

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;
use tracing::info;

use tilevault::config::{format_size, parse_size, ConfigFile};
use tilevault::sync::{self, DispatchPolicy, FetchOutcome, StopReason, SyncEvent, SyncReport};

use crate::error::CliError;

/// Arguments for the sync command.
#[derive(Debug, Args)]
pub struct SyncArgs {
    /// Output directory for the tile cache
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Tile service URL template with {z}, {x} and {y} placeholders
    #[arg(long)]
    pub url: Option<String>,

    /// Storage budget, e.g. 10GB
    #[arg(long)]
    pub limit: Option<String>,

    /// Nominal accounting size per tile, e.g. 8KB
    #[arg(long)]
    pub tile_cost: Option<String>,

    /// Clamp the enumeration depth at this zoom level
    #[arg(long)]
    pub max_zoom: Option<u8>,

    /// Sync only the named region (repeatable)
    #[arg(long = "region")]
    pub regions: Vec<String>,

    /// Number of concurrent downloads
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Fetch one tile at a time instead of concurrently
    #[arg(long)]
    pub sequential: bool,
}

/// Run a sync with the file config overridden by CLI flags.
pub fn run(config_file: &ConfigFile, args: SyncArgs) -> Result<(), CliError> {
    let mut config = config_file.to_sync_config();

    if let Some(output) = args.output {
        config.output_root = output;
    }
    if let Some(url) = args.url {
        config.url_template = url;
    }
    if let Some(limit) = &args.limit {
        config.storage_limit = parse_size(limit).ok_or_else(|| CliError::InvalidSize {
            flag: "--limit",
            value: limit.clone(),
        })?;
    }
    if let Some(cost) = &args.tile_cost {
        config.tile_cost = parse_size(cost).ok_or_else(|| CliError::InvalidSize {
            flag: "--tile-cost",
            value: cost.clone(),
        })?;
    }
    if let Some(cap) = args.max_zoom {
        config.zoom_cap = Some(cap);
    }
    if !args.regions.is_empty() {
        config.catalog = config
            .catalog
            .select(&args.regions)
            .map_err(CliError::UnknownRegions)?;
    }
    if args.sequential {
        config.dispatch = DispatchPolicy::Sequential;
    } else if let Some(workers) = args.concurrency {
        config.dispatch = DispatchPolicy::Concurrent { workers };
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::RuntimeCreation)?;

    // Ctrl-C stops dispatch; in-flight downloads drain before exit.
    let cancellation = CancellationToken::new();
    let ctrlc_token = cancellation.clone();
    let _ = ctrlc::set_handler(move || {
        eprintln!("\nStopping after in-flight downloads...");
        ctrlc_token.cancel();
    });

    info!(
        output = %config.output_root.display(),
        limit = %format_size(config.storage_limit),
        regions = config.catalog.len(),
        "Starting sync"
    );

    let (events_tx, events_rx) = tokio::sync::mpsc::unbounded_channel();
    let report = runtime.block_on(async {
        let progress = tokio::spawn(render_progress(events_rx));
        let report = sync::run_sync(&config, cancellation, Some(events_tx)).await;
        // Sender dropped inside run_sync's orchestrator; the progress
        // task drains the channel and finishes on its own.
        let _ = progress.await;
        report
    })?;

    print_summary(&report);
    Ok(())
}

/// Drains sync events into a progress display.
async fn render_progress(
    mut events: tokio::sync::mpsc::UnboundedReceiver<SyncEvent>,
) {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );

    let mut fetched = 0u64;
    let mut skipped = 0u64;
    while let Some(event) = events.recv().await {
        match event {
            SyncEvent::TileCompleted { outcome, .. } => {
                match outcome {
                    FetchOutcome::Fetched { .. } => fetched += 1,
                    FetchOutcome::Missing | FetchOutcome::Failed => skipped += 1,
                }
                bar.set_message(format!("{} tiles fetched, {} skipped", fetched, skipped));
                bar.tick();
            }
            SyncEvent::BudgetExhausted { consumed, limit } => {
                bar.set_message(format!(
                    "budget exhausted ({} of {}), draining...",
                    format_size(consumed),
                    format_size(limit)
                ));
                bar.tick();
            }
        }
    }
    bar.finish_and_clear();
}

fn print_summary(report: &SyncReport) {
    println!("Sync {}", report.stop_reason);
    println!("  Fetched: {} tiles", report.tiles_fetched);
    println!("  Missing: {} tiles", report.tiles_missing);
    println!("  Failed:  {} tiles", report.tiles_failed);
    println!("  Charged: {}", format_size(report.bytes_recorded));
    if report.stop_reason == StopReason::BudgetExhausted {
        println!("  Coverage is complete below the zoom level where the budget ran out.");
    }
}

//! The `plan` command: dry-run tile counts per zoom level.

use clap::Args;

use tilevault::config::{format_size, ConfigFile};
use tilevault::plan::PlanSummary;

use crate::error::CliError;

/// Default enumeration depth for dry runs.
///
/// Walking the full grid at city zoom would take hours; a dry run to
/// zoom 8 is enough to see the shape of a sync.
const DEFAULT_PLAN_DEPTH: u8 = 8;

/// Arguments for the plan command.
#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Deepest zoom level to enumerate
    #[arg(long, default_value_t = DEFAULT_PLAN_DEPTH)]
    pub max_zoom: u8,

    /// Plan only the named region (repeatable)
    #[arg(long = "region")]
    pub regions: Vec<String>,
}

/// Print the per-zoom tile counts a sync would attempt.
pub fn run(config_file: &ConfigFile, args: PlanArgs) -> Result<(), CliError> {
    let config = config_file.to_sync_config();
    let catalog = if args.regions.is_empty() {
        config.catalog
    } else {
        config
            .catalog
            .select(&args.regions)
            .map_err(CliError::UnknownRegions)?
    };

    let depth = catalog
        .max_zoom()
        .unwrap_or(0)
        .min(args.max_zoom)
        .min(config.zoom_cap.unwrap_or(u8::MAX));
    let summary = PlanSummary::compute(&catalog, depth);

    println!("Planned tiles to zoom {} ({} regions):", depth, catalog.len());
    for (zoom, count) in &summary.per_zoom {
        println!(
            "  zoom {:>2}: {:>10} tiles (~{})",
            zoom,
            count,
            format_size(count * config.tile_cost)
        );
    }
    println!(
        "  total:   {:>10} tiles (~{} charged at {}/tile)",
        summary.total(),
        format_size(summary.total() * config.tile_cost),
        format_size(config.tile_cost)
    );

    Ok(())
}

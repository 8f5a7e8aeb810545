//! The `regions` command: list the catalog.

use tilevault::config::ConfigFile;

use crate::error::CliError;

/// Print the region catalog in order.
pub fn run(config_file: &ConfigFile) -> Result<(), CliError> {
    let config = config_file.to_sync_config();

    if config.catalog.is_empty() {
        println!("No regions configured.");
        return Ok(());
    }

    println!("{} regions:", config.catalog.len());
    for region in config.catalog.regions() {
        println!(
            "  {:<14} zoom 0-{:<2}  {}",
            region.name, region.max_zoom, region.bbox
        );
    }
    Ok(())
}

//! Cache maintenance CLI commands.

use clap::Subcommand;

use tilevault::config::{format_size, ConfigFile};
use tilevault::store::TileStore;

use crate::error::CliError;

/// Cache action subcommands.
#[derive(Debug, Subcommand)]
pub enum CacheAction {
    /// Remove all cached tiles
    Clear,
    /// Show tile cache statistics
    Stats,
}

/// Run a cache subcommand.
pub fn run(config_file: &ConfigFile, action: CacheAction) -> Result<(), CliError> {
    let config = config_file.to_sync_config();
    let store = TileStore::new(&config.output_root, config.extension.as_str());

    match action {
        CacheAction::Clear => {
            println!("Clearing tile cache at: {}", store.root().display());

            let result = store.clear()?;
            println!(
                "Deleted {} files, freed {}",
                result.files_deleted,
                format_size(result.bytes_freed)
            );
            Ok(())
        }
        CacheAction::Stats => {
            println!("Tile cache: {}", store.root().display());

            let stats = store.stats()?;
            println!("  Files: {}", stats.files);
            println!("  Size:  {}", format_size(stats.bytes));
            Ok(())
        }
    }
}

//! CLI error types.

use std::fmt;

use tilevault::config::ConfigError;
use tilevault::store::StoreError;
use tilevault::sync::SyncError;

/// Errors that surface to the user as a non-zero exit.
///
/// Per-tile fetch failures and budget exhaustion are not errors; only
/// setup problems land here.
#[derive(Debug)]
pub enum CliError {
    /// Configuration file could not be loaded or interpreted.
    Config(ConfigError),

    /// A `--region` flag named regions the catalog does not contain.
    UnknownRegions(Vec<String>),

    /// A size flag could not be parsed.
    InvalidSize { flag: &'static str, value: String },

    /// Failed to create the Tokio runtime.
    RuntimeCreation(std::io::Error),

    /// Sync setup failed (HTTP client, URL template).
    Sync(SyncError),

    /// Cache maintenance failed.
    Cache(StoreError),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(e) => {
                write!(f, "Configuration error: {}", e)
            }
            CliError::UnknownRegions(names) => {
                write!(f, "Unknown regions: {}", names.join(", "))
            }
            CliError::InvalidSize { flag, value } => {
                write!(f, "Invalid size for {}: {:?} (try 500MB or 8KB)", flag, value)
            }
            CliError::RuntimeCreation(e) => {
                write!(f, "Failed to create Tokio runtime: {}", e)
            }
            CliError::Sync(e) => {
                write!(f, "Sync failed to start: {}", e)
            }
            CliError::Cache(e) => {
                write!(f, "Cache operation failed: {}", e)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::RuntimeCreation(e) => Some(e),
            CliError::Sync(e) => Some(e),
            CliError::Cache(e) => Some(e),
            CliError::UnknownRegions(_) | CliError::InvalidSize { .. } => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e)
    }
}

impl From<SyncError> for CliError {
    fn from(e: SyncError) -> Self {
        CliError::Sync(e)
    }
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        CliError::Cache(e)
    }
}

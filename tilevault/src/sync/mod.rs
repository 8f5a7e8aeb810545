//! Sync pipeline
//!
//! Ties the planner, provider, store, and budget together into a single
//! run. Library callers with custom providers use [`SyncOrchestrator`]
//! directly; [`run_sync`] is the turnkey entry point the CLI uses, wiring
//! a reqwest-backed template provider from a [`SyncConfig`].

mod config;
mod orchestrator;
mod types;

pub use config::{
    DispatchPolicy, SyncConfig, DEFAULT_CONCURRENCY, DEFAULT_EXTENSION, DEFAULT_HTTP_TIMEOUT_SECS,
    DEFAULT_STORAGE_LIMIT, DEFAULT_TILE_COST, DEFAULT_URL_TEMPLATE,
};
pub use orchestrator::SyncOrchestrator;
pub use types::{FetchOutcome, StopReason, SyncEvent, SyncReport};

use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

use crate::budget::StorageBudget;
use crate::provider::{ProviderError, ReqwestClient, TemplateProvider};
use crate::store::TileStore;

/// Errors that prevent a sync run from starting.
///
/// Once a run is underway nothing fails it; these cover setup only.
#[derive(Debug, Error)]
pub enum SyncError {
    /// HTTP client construction or URL template validation failed.
    #[error("provider setup failed: {0}")]
    Provider(#[from] ProviderError),
}

/// Runs a full sync from configuration.
///
/// Builds the HTTP provider, store, and budget from `config`, then runs
/// the orchestrator to completion.
///
/// # Arguments
///
/// * `config` - The immutable run configuration
/// * `cancellation` - Token observed between dispatches (Ctrl-C)
/// * `events` - Optional progress channel for a UI
pub async fn run_sync(
    config: &SyncConfig,
    cancellation: CancellationToken,
    events: Option<UnboundedSender<SyncEvent>>,
) -> Result<SyncReport, SyncError> {
    let client = ReqwestClient::with_timeout(config.http_timeout_secs)?;
    let provider =
        TemplateProvider::new(client, config.url_template.as_str(), config.provider_max_zoom)?;
    let store = TileStore::new(&config.output_root, config.extension.as_str());
    let budget = StorageBudget::new(config.storage_limit, config.tile_cost);

    let mut orchestrator = SyncOrchestrator::new(provider, store, budget)
        .with_dispatch(config.dispatch)
        .with_zoom_cap(config.zoom_cap)
        .with_cancellation(cancellation);
    if let Some(sender) = events {
        orchestrator = orchestrator.with_events(sender);
    }

    Ok(orchestrator.run(&config.catalog).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_sync_rejects_bad_template() {
        let config = SyncConfig::new("/tmp/tiles").with_url_template("http://tiles.test/static.png");
        let result = run_sync(&config, CancellationToken::new(), None).await;
        assert!(matches!(
            result,
            Err(SyncError::Provider(ProviderError::BadTemplate(_)))
        ));
    }
}

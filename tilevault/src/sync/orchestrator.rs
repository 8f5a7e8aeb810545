//! Sync orchestrator
//!
//! Drives one sync run: enumerates the planned tiles, dispatches fetches
//! under the configured policy, charges the storage budget as results
//! arrive, and stops cleanly when the budget is exhausted.
//!
//! # Lifecycle
//!
//! A run moves `Running → Stopping → Done`. In `Running` the orchestrator
//! keeps the in-flight set full from the plan; the moment the budget
//! tracker reports exhaustion (or the run is cancelled, or the plan is
//! drained) it enters `Stopping`: nothing new is dispatched and already
//! in-flight fetches run to completion; dispatched work is never
//! cancelled mid-flight. Once the in-flight set drains the run is `Done`.
//!
//! # Budget discipline
//!
//! Completions are absorbed by the single orchestrator loop, which is
//! the only caller of [`StorageBudget::record`], so out-of-order arrival
//! under concurrency never races the stop decision. Because coarse tiles
//! are dispatched strictly before fine ones, a budget stop can only
//! leave holes at the deepest zoom level reached.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::budget::StorageBudget;
use crate::coord::TileCoord;
use crate::plan::TilePlan;
use crate::provider::{ProviderError, TileProvider};
use crate::region::RegionCatalog;
use crate::store::TileStore;

use super::config::DispatchPolicy;
use super::types::{FetchOutcome, StopReason, SyncEvent, SyncReport};

/// Run lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    /// Dispatching new fetches from the plan.
    Running,
    /// Draining in-flight fetches; no new dispatch.
    Stopping,
}

/// Running totals for one sync run.
#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    fetched: u64,
    missing: u64,
    failed: u64,
}

impl Tally {
    fn apply(&mut self, outcome: FetchOutcome) {
        match outcome {
            FetchOutcome::Fetched { .. } => self.fetched += 1,
            FetchOutcome::Missing => self.missing += 1,
            FetchOutcome::Failed => self.failed += 1,
        }
    }
}

/// Coordinates enumeration, dispatch, storage, and budget for one run.
///
/// Generic over the provider so tests can inject a mock HTTP source.
pub struct SyncOrchestrator<P> {
    provider: Arc<P>,
    store: TileStore,
    budget: Arc<StorageBudget>,
    dispatch: DispatchPolicy,
    zoom_cap: Option<u8>,
    cancellation: CancellationToken,
    events: Option<UnboundedSender<SyncEvent>>,
}

impl<P: TileProvider + 'static> SyncOrchestrator<P> {
    /// Creates an orchestrator with the default dispatch policy.
    pub fn new(provider: P, store: TileStore, budget: StorageBudget) -> Self {
        Self {
            provider: Arc::new(provider),
            store,
            budget: Arc::new(budget),
            dispatch: DispatchPolicy::default(),
            zoom_cap: None,
            cancellation: CancellationToken::new(),
            events: None,
        }
    }

    /// Sets the dispatch policy.
    pub fn with_dispatch(mut self, dispatch: DispatchPolicy) -> Self {
        self.dispatch = dispatch;
        self
    }

    /// Clamps the enumeration depth.
    pub fn with_zoom_cap(mut self, cap: Option<u8>) -> Self {
        self.zoom_cap = cap;
        self
    }

    /// Attaches an external cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Attaches a progress event channel.
    pub fn with_events(mut self, sender: UnboundedSender<SyncEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    /// Runs the sync to completion and returns the report.
    ///
    /// Always succeeds: per-tile failures are absorbed into the tally
    /// and budget exhaustion is a normal stop.
    pub async fn run(&self, catalog: &RegionCatalog) -> SyncReport {
        info!(
            regions = catalog.len(),
            limit_bytes = self.budget.limit(),
            tile_cost = self.budget.tile_cost(),
            policy = ?self.dispatch,
            "Starting tile sync"
        );

        let report = match self.dispatch {
            DispatchPolicy::Sequential => self.run_sequential(catalog).await,
            DispatchPolicy::Concurrent { workers } => {
                self.run_concurrent(catalog, workers.max(1)).await
            }
        };

        info!(
            fetched = report.tiles_fetched,
            missing = report.tiles_missing,
            failed = report.tiles_failed,
            bytes_recorded = report.bytes_recorded,
            reason = %report.stop_reason,
            "Tile sync finished"
        );
        report
    }

    /// One fetch at a time; budget checked after every tile.
    async fn run_sequential(&self, catalog: &RegionCatalog) -> SyncReport {
        let mut tally = Tally::default();
        let mut reason = StopReason::Completed;

        for tile in self.plan(catalog) {
            if self.cancellation.is_cancelled() {
                reason = StopReason::Cancelled;
                break;
            }

            let outcome =
                Self::fetch_and_store(Arc::clone(&self.provider), self.store.clone(), tile).await;
            tally.apply(outcome);
            self.emit(SyncEvent::TileCompleted { tile, outcome });

            if matches!(outcome, FetchOutcome::Fetched { .. }) && !self.budget.record() {
                self.note_budget_exhausted();
                reason = StopReason::BudgetExhausted;
                break;
            }
        }

        self.finish(tally, reason)
    }

    /// Bounded in-flight set, drained as completions arrive.
    async fn run_concurrent(&self, catalog: &RegionCatalog, workers: usize) -> SyncReport {
        let mut plan = self.plan(catalog);
        let mut tasks: JoinSet<(TileCoord, FetchOutcome)> = JoinSet::new();
        let mut tally = Tally::default();
        let mut state = RunState::Running;
        let mut reason = StopReason::Completed;

        loop {
            // Keep the in-flight set full while running.
            while state == RunState::Running && tasks.len() < workers {
                if self.cancellation.is_cancelled() {
                    state = RunState::Stopping;
                    reason = StopReason::Cancelled;
                    break;
                }
                match plan.next() {
                    Some(tile) => {
                        let provider = Arc::clone(&self.provider);
                        let store = self.store.clone();
                        tasks.spawn(async move {
                            (tile, Self::fetch_and_store(provider, store, tile).await)
                        });
                    }
                    None => {
                        state = RunState::Stopping;
                        break;
                    }
                }
            }

            // Absorb one completion; the plan is drained when this
            // returns None in the Stopping state.
            match tasks.join_next().await {
                Some(Ok((tile, outcome))) => {
                    tally.apply(outcome);
                    self.emit(SyncEvent::TileCompleted { tile, outcome });

                    if matches!(outcome, FetchOutcome::Fetched { .. })
                        && !self.budget.record()
                        && reason == StopReason::Completed
                    {
                        self.note_budget_exhausted();
                        state = RunState::Stopping;
                        reason = StopReason::BudgetExhausted;
                    }
                }
                Some(Err(e)) => {
                    warn!(error = %e, "Fetch task aborted");
                    tally.failed += 1;
                }
                None => break,
            }
        }

        self.finish(tally, reason)
    }

    /// Downloads one tile and persists it, classifying the outcome.
    ///
    /// Every failure is local to the tile: the service answering
    /// not-found, a connection failure, and a write failure all skip
    /// this tile without touching the rest of the run.
    async fn fetch_and_store(provider: Arc<P>, store: TileStore, tile: TileCoord) -> FetchOutcome {
        match provider.fetch_tile(tile).await {
            Ok(body) => match store.write(tile, &body).await {
                Ok(bytes) => FetchOutcome::Fetched { bytes },
                Err(e) => {
                    warn!(tile = %tile, error = %e, "Tile write failed");
                    FetchOutcome::Failed
                }
            },
            Err(ProviderError::Missing { status, .. }) => {
                debug!(tile = %tile, status, "Tile not available");
                FetchOutcome::Missing
            }
            Err(e) => {
                warn!(tile = %tile, error = %e, "Tile fetch failed");
                FetchOutcome::Failed
            }
        }
    }

    fn plan<'a>(&self, catalog: &'a RegionCatalog) -> TilePlan<'a> {
        match self.zoom_cap {
            Some(cap) => TilePlan::with_zoom_cap(catalog, cap),
            None => TilePlan::new(catalog),
        }
    }

    fn note_budget_exhausted(&self) {
        info!(
            consumed = self.budget.consumed(),
            limit = self.budget.limit(),
            "Storage budget exhausted, stopping dispatch"
        );
        self.emit(SyncEvent::BudgetExhausted {
            consumed: self.budget.consumed(),
            limit: self.budget.limit(),
        });
    }

    fn finish(&self, tally: Tally, reason: StopReason) -> SyncReport {
        SyncReport {
            tiles_fetched: tally.fetched,
            tiles_missing: tally.missing,
            tiles_failed: tally.failed,
            bytes_recorded: self.budget.consumed(),
            stop_reason: reason,
        }
    }

    fn emit(&self, event: SyncEvent) {
        if let Some(sender) = &self.events {
            // Progress display lagging or gone never stalls the run.
            let _ = sender.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::BoundingBox;
    use crate::provider::{MockHttpClient, TemplateProvider};
    use crate::region::Region;
    use tempfile::tempdir;

    const TEMPLATE: &str = "http://tiles.test/{z}/{x}/{y}.png";
    const TILE_COST: u64 = 8 * 1024;

    fn world_catalog(max_zoom: u8) -> RegionCatalog {
        RegionCatalog::new(vec![Region::new("world", BoundingBox::world(), max_zoom)])
    }

    fn provider_ok() -> TemplateProvider<MockHttpClient> {
        TemplateProvider::new(MockHttpClient::ok(vec![0xAB; 64]), TEMPLATE, 22).unwrap()
    }

    fn provider_missing() -> TemplateProvider<MockHttpClient> {
        TemplateProvider::new(
            MockHttpClient::failing(ProviderError::Missing {
                status: 404,
                url: "http://tiles.test/0/0/0.png".to_string(),
            }),
            TEMPLATE,
            22,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_concurrent_run_completes_world_zoom_one() {
        let dir = tempdir().unwrap();
        let store = TileStore::new(dir.path(), "png");
        let orchestrator = SyncOrchestrator::new(
            provider_ok(),
            store.clone(),
            StorageBudget::new(100 * TILE_COST, TILE_COST),
        )
        .with_dispatch(DispatchPolicy::Concurrent { workers: 4 });

        let report = orchestrator.run(&world_catalog(1)).await;

        assert_eq!(report.stop_reason, StopReason::Completed);
        assert_eq!(report.tiles_fetched, 5);
        assert_eq!(report.tiles_missing, 0);
        assert_eq!(report.tiles_failed, 0);
        assert_eq!(report.bytes_recorded, 5 * TILE_COST);

        // All five files landed at their addresses
        for (z, x, y) in [(0, 0, 0), (1, 0, 0), (1, 0, 1), (1, 1, 0), (1, 1, 1)] {
            let path = store.tile_path(TileCoord::new(z, x, y).unwrap());
            assert!(path.exists(), "missing tile file {}", path.display());
        }
    }

    #[tokio::test]
    async fn test_sequential_budget_stop_after_exceeding_tile() {
        let dir = tempdir().unwrap();
        let store = TileStore::new(dir.path(), "png");
        // Budget for three tiles; the fourth record flips it.
        let orchestrator = SyncOrchestrator::new(
            provider_ok(),
            store.clone(),
            StorageBudget::new(3 * TILE_COST, TILE_COST),
        )
        .with_dispatch(DispatchPolicy::Sequential);

        let report = orchestrator.run(&world_catalog(2)).await;

        assert_eq!(report.stop_reason, StopReason::BudgetExhausted);
        // The tile that crossed the limit was already fetched and kept.
        assert_eq!(report.tiles_fetched, 4);
        assert_eq!(store.stats().unwrap().files, 4);
    }

    #[tokio::test]
    async fn test_budget_stop_preserves_low_zoom_coverage() {
        let dir = tempdir().unwrap();
        let store = TileStore::new(dir.path(), "png");
        // Enough for zoom 0 and zoom 1 (5 tiles) plus one more record.
        let orchestrator = SyncOrchestrator::new(
            provider_ok(),
            store.clone(),
            StorageBudget::new(5 * TILE_COST, TILE_COST),
        )
        .with_dispatch(DispatchPolicy::Sequential);

        let report = orchestrator.run(&world_catalog(3)).await;
        assert_eq!(report.stop_reason, StopReason::BudgetExhausted);

        // Every tile at zoom 0 and zoom 1 must be present: the cutoff
        // can only punch holes at the deepest zoom reached.
        for (z, x, y) in [(0, 0, 0), (1, 0, 0), (1, 0, 1), (1, 1, 0), (1, 1, 1)] {
            let path = store.tile_path(TileCoord::new(z, x, y).unwrap());
            assert!(path.exists(), "low-zoom hole at {}/{}/{}", z, x, y);
        }
    }

    #[tokio::test]
    async fn test_concurrent_budget_stop_drains_in_flight() {
        let dir = tempdir().unwrap();
        let store = TileStore::new(dir.path(), "png");
        let workers = 4;
        let orchestrator = SyncOrchestrator::new(
            provider_ok(),
            store.clone(),
            StorageBudget::new(3 * TILE_COST, TILE_COST),
        )
        .with_dispatch(DispatchPolicy::Concurrent { workers });

        let report = orchestrator.run(&world_catalog(3)).await;

        assert_eq!(report.stop_reason, StopReason::BudgetExhausted);
        // The stop lands after the flipping record; tiles already in
        // flight drain and are kept, bounded by the worker width.
        assert!(report.tiles_fetched >= 4);
        assert!(
            report.tiles_fetched <= 4 + workers as u64,
            "fetched {} tiles, expected at most {}",
            report.tiles_fetched,
            4 + workers
        );
        assert_eq!(store.stats().unwrap().files, report.tiles_fetched);
    }

    #[tokio::test]
    async fn test_missing_tiles_are_skipped_silently() {
        let dir = tempdir().unwrap();
        let store = TileStore::new(dir.path(), "png");
        let orchestrator = SyncOrchestrator::new(
            provider_missing(),
            store.clone(),
            StorageBudget::new(100 * TILE_COST, TILE_COST),
        )
        .with_dispatch(DispatchPolicy::Concurrent { workers: 2 });

        let report = orchestrator.run(&world_catalog(1)).await;

        assert_eq!(report.stop_reason, StopReason::Completed);
        assert_eq!(report.tiles_fetched, 0);
        assert_eq!(report.tiles_missing, 5);
        assert_eq!(report.bytes_recorded, 0);
        assert_eq!(store.stats().unwrap().files, 0);
    }

    #[tokio::test]
    async fn test_transient_failures_never_abort_the_run() {
        let dir = tempdir().unwrap();
        let store = TileStore::new(dir.path(), "png");
        let provider = TemplateProvider::new(
            MockHttpClient::failing(ProviderError::Transient("connection refused".to_string())),
            TEMPLATE,
            22,
        )
        .unwrap();
        let orchestrator = SyncOrchestrator::new(
            provider,
            store,
            StorageBudget::new(100 * TILE_COST, TILE_COST),
        )
        .with_dispatch(DispatchPolicy::Sequential);

        let report = orchestrator.run(&world_catalog(1)).await;

        assert_eq!(report.stop_reason, StopReason::Completed);
        assert_eq!(report.tiles_failed, 5);
    }

    #[tokio::test]
    async fn test_pre_cancelled_run_fetches_nothing() {
        let dir = tempdir().unwrap();
        let store = TileStore::new(dir.path(), "png");
        let token = CancellationToken::new();
        token.cancel();

        let orchestrator = SyncOrchestrator::new(
            provider_ok(),
            store.clone(),
            StorageBudget::new(100 * TILE_COST, TILE_COST),
        )
        .with_cancellation(token);

        let report = orchestrator.run(&world_catalog(2)).await;

        assert_eq!(report.stop_reason, StopReason::Cancelled);
        assert_eq!(report.tiles_fetched, 0);
        assert_eq!(store.stats().unwrap().files, 0);
    }

    #[tokio::test]
    async fn test_zoom_cap_limits_run_depth() {
        let dir = tempdir().unwrap();
        let store = TileStore::new(dir.path(), "png");
        let orchestrator = SyncOrchestrator::new(
            provider_ok(),
            store.clone(),
            StorageBudget::new(1000 * TILE_COST, TILE_COST),
        )
        .with_zoom_cap(Some(1));

        let report = orchestrator.run(&world_catalog(5)).await;

        assert_eq!(report.stop_reason, StopReason::Completed);
        assert_eq!(report.tiles_fetched, 5);
    }

    #[tokio::test]
    async fn test_events_report_each_completion() {
        let dir = tempdir().unwrap();
        let store = TileStore::new(dir.path(), "png");
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        let orchestrator = SyncOrchestrator::new(
            provider_ok(),
            store,
            StorageBudget::new(100 * TILE_COST, TILE_COST),
        )
        .with_events(tx);

        orchestrator.run(&world_catalog(1)).await;

        let mut completions = 0;
        while let Ok(event) = rx.try_recv() {
            if matches!(event, SyncEvent::TileCompleted { .. }) {
                completions += 1;
            }
        }
        assert_eq!(completions, 5);
    }
}

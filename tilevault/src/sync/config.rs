//! Sync run configuration.
//!
//! `SyncConfig` is the single immutable configuration value threaded into
//! the orchestrator. It is constructed once at startup (from the config
//! file, CLI flags, or test fixtures) and passed by reference; nothing
//! in the library reads ambient global state.

use std::path::PathBuf;

use crate::coord::MAX_ZOOM;
use crate::region::RegionCatalog;

/// Default tile service URL template.
pub const DEFAULT_URL_TEMPLATE: &str = "http://a.basemaps.cartocdn.com/light_all/{z}/{x}/{y}.png";

/// Default tile file extension.
pub const DEFAULT_EXTENSION: &str = "png";

/// Default storage budget: 10 GB.
pub const DEFAULT_STORAGE_LIMIT: u64 = 10 * 1024 * 1024 * 1024;

/// Default nominal per-tile accounting size: 8 KB, the approximate size
/// of a 256x256 basemap tile.
pub const DEFAULT_TILE_COST: u64 = 8 * 1024;

/// Default number of concurrent downloads.
pub const DEFAULT_CONCURRENCY: usize = 50;

/// Default HTTP request timeout in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// How tile fetches are dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchPolicy {
    /// Up to `workers` fetches in flight, drained as they complete.
    Concurrent { workers: usize },

    /// One fetch at a time, budget checked after every tile.
    Sequential,
}

impl Default for DispatchPolicy {
    fn default() -> Self {
        DispatchPolicy::Concurrent {
            workers: DEFAULT_CONCURRENCY,
        }
    }
}

/// Immutable configuration for one sync run.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Tile service URL template with `{z}`, `{x}`, `{y}` placeholders.
    pub url_template: String,

    /// Root directory of the tile store.
    pub output_root: PathBuf,

    /// File extension for stored tiles.
    pub extension: String,

    /// Storage budget in bytes.
    pub storage_limit: u64,

    /// Nominal bytes charged per stored tile.
    pub tile_cost: u64,

    /// Optional clamp on the enumeration depth.
    pub zoom_cap: Option<u8>,

    /// Regions to sync.
    pub catalog: RegionCatalog,

    /// Dispatch policy for the run.
    pub dispatch: DispatchPolicy,

    /// HTTP request timeout in seconds.
    pub http_timeout_secs: u64,

    /// Deepest zoom level the tile service offers.
    pub provider_max_zoom: u8,
}

impl SyncConfig {
    /// Creates a config with defaults for everything but the output root.
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
            output_root: output_root.into(),
            extension: DEFAULT_EXTENSION.to_string(),
            storage_limit: DEFAULT_STORAGE_LIMIT,
            tile_cost: DEFAULT_TILE_COST,
            zoom_cap: None,
            catalog: RegionCatalog::builtin(),
            dispatch: DispatchPolicy::default(),
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            provider_max_zoom: MAX_ZOOM,
        }
    }

    /// Sets the URL template.
    pub fn with_url_template(mut self, template: impl Into<String>) -> Self {
        self.url_template = template.into();
        self
    }

    /// Sets the storage budget.
    pub fn with_storage_limit(mut self, limit: u64) -> Self {
        self.storage_limit = limit;
        self
    }

    /// Sets the per-tile accounting cost.
    pub fn with_tile_cost(mut self, cost: u64) -> Self {
        self.tile_cost = cost;
        self
    }

    /// Clamps the enumeration depth.
    pub fn with_zoom_cap(mut self, cap: u8) -> Self {
        self.zoom_cap = Some(cap);
        self
    }

    /// Replaces the region catalog.
    pub fn with_catalog(mut self, catalog: RegionCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Sets the dispatch policy.
    pub fn with_dispatch(mut self, dispatch: DispatchPolicy) -> Self {
        self.dispatch = dispatch;
        self
    }
}

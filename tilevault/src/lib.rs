//! TileVault - Bulk map tile downloader with a storage budget
//!
//! This library selects map tiles by geographic bounding boxes at
//! per-region zoom depths, downloads them concurrently from a tiled
//! imagery HTTP service, and writes them to a hierarchical local cache,
//! stopping once a configured storage budget is exhausted.
//!
//! # Architecture
//!
//! - [`coord`] - tile grid geometry on the linear equirectangular scheme
//! - [`region`] - named areas of interest with zoom depths
//! - [`plan`] - breadth-first enumeration of the tiles a catalog wants
//! - [`provider`] - HTTP tile sources behind a `{z}/{x}/{y}` template
//! - [`store`] - the `<root>/<z>/<x>/<y>.<ext>` on-disk cache
//! - [`budget`] - nominal per-tile storage accounting
//! - [`sync`] - the orchestrator tying the pipeline together
//! - [`config`] - INI configuration file handling
//! - [`logging`] - tracing subscriber bootstrap

pub mod budget;
pub mod config;
pub mod coord;
pub mod logging;
pub mod plan;
pub mod provider;
pub mod region;
pub mod store;
pub mod sync;

//! Configuration file handling
//!
//! TileVault reads an INI config file from
//! `~/.config/tilevault/tilevault.conf` (per-platform via `dirs`). Every
//! key is optional; missing keys fall back to the built-in defaults, and
//! CLI flags override file values. Sizes are written human-readable
//! ("10GB", "8KB") and parsed here.
//!
//! ```ini
//! [provider]
//! url_template = http://a.basemaps.cartocdn.com/light_all/{z}/{x}/{y}.png
//! extension = png
//! max_zoom = 22
//! timeout_secs = 30
//!
//! [cache]
//! directory = /var/cache/tilevault
//! limit = 10GB
//! tile_cost = 8KB
//!
//! [sync]
//! concurrency = 50
//! sequential = false
//!
//! [region.bayonne]
//! bbox = -1.49, 43.46, -1.45, 43.50
//! max_zoom = 22
//! ```
//!
//! When any `[region.*]` section is present the file's regions replace
//! the built-in catalog entirely, in file order.

use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;

use crate::coord::{BoundingBox, MAX_ZOOM};
use crate::region::{Region, RegionCatalog};
use crate::sync::{
    DispatchPolicy, SyncConfig, DEFAULT_CONCURRENCY, DEFAULT_EXTENSION, DEFAULT_HTTP_TIMEOUT_SECS,
    DEFAULT_STORAGE_LIMIT, DEFAULT_TILE_COST, DEFAULT_URL_TEMPLATE,
};

/// Config file name under the per-user config directory.
const CONFIG_FILE_NAME: &str = "tilevault.conf";

/// Directory name under the per-user config and cache directories.
const APP_DIR_NAME: &str = "tilevault";

/// Errors produced while loading or interpreting a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read or parsed as INI.
    #[error("failed to load config file {path}: {source}")]
    Load { path: PathBuf, source: ini::Error },

    /// A key holds a value that cannot be interpreted.
    #[error("invalid value for [{section}] {key}: {value:?}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
    },
}

/// `[provider]` section.
#[derive(Debug, Clone)]
pub struct ProviderSection {
    pub url_template: String,
    pub extension: String,
    pub max_zoom: u8,
    pub timeout_secs: u64,
}

impl Default for ProviderSection {
    fn default() -> Self {
        Self {
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
            max_zoom: MAX_ZOOM,
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

/// `[cache]` section.
#[derive(Debug, Clone)]
pub struct CacheSection {
    pub directory: PathBuf,
    pub limit: u64,
    pub tile_cost: u64,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            directory: default_cache_dir(),
            limit: DEFAULT_STORAGE_LIMIT,
            tile_cost: DEFAULT_TILE_COST,
        }
    }
}

/// `[sync]` section.
#[derive(Debug, Clone)]
pub struct SyncSection {
    pub concurrency: usize,
    pub sequential: bool,
    pub zoom_cap: Option<u8>,
}

impl Default for SyncSection {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            sequential: false,
            zoom_cap: None,
        }
    }
}

/// Parsed configuration file.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    pub provider: ProviderSection,
    pub cache: CacheSection,
    pub sync: SyncSection,
    /// Regions from `[region.*]` sections, replacing the built-in
    /// catalog when present.
    pub regions: Option<RegionCatalog>,
}

impl ConfigFile {
    /// The per-user config file path, when a config directory exists.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Loads the per-user config file, or defaults when absent.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Loads a config file from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_file(path).map_err(|source| ConfigError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(section) = ini.section(Some("provider")) {
            if let Some(value) = section.get("url_template") {
                config.provider.url_template = value.to_string();
            }
            if let Some(value) = section.get("extension") {
                config.provider.extension = value.to_string();
            }
            if let Some(value) = section.get("max_zoom") {
                config.provider.max_zoom = parse_key("provider", "max_zoom", value)?;
            }
            if let Some(value) = section.get("timeout_secs") {
                config.provider.timeout_secs = parse_key("provider", "timeout_secs", value)?;
            }
        }

        if let Some(section) = ini.section(Some("cache")) {
            if let Some(value) = section.get("directory") {
                config.cache.directory = PathBuf::from(value);
            }
            if let Some(value) = section.get("limit") {
                config.cache.limit = parse_size(value)
                    .ok_or_else(|| invalid("cache", "limit", value))?;
            }
            if let Some(value) = section.get("tile_cost") {
                config.cache.tile_cost = parse_size(value)
                    .ok_or_else(|| invalid("cache", "tile_cost", value))?;
            }
        }

        if let Some(section) = ini.section(Some("sync")) {
            if let Some(value) = section.get("concurrency") {
                config.sync.concurrency = parse_key("sync", "concurrency", value)?;
            }
            if let Some(value) = section.get("sequential") {
                config.sync.sequential = parse_key("sync", "sequential", value)?;
            }
            if let Some(value) = section.get("zoom_cap") {
                config.sync.zoom_cap = Some(parse_key("sync", "zoom_cap", value)?);
            }
        }

        let mut regions = Vec::new();
        for (name, section) in ini.iter() {
            let Some(name) = name else { continue };
            let Some(region_name) = name.strip_prefix("region.") else {
                continue;
            };

            let bbox_value = section
                .get("bbox")
                .ok_or_else(|| invalid(name, "bbox", "<missing>"))?;
            let bbox = parse_bbox(bbox_value).ok_or_else(|| invalid(name, "bbox", bbox_value))?;
            let max_zoom = match section.get("max_zoom") {
                Some(value) => parse_key(name, "max_zoom", value)?,
                None => MAX_ZOOM,
            };
            regions.push(Region::new(region_name, bbox, max_zoom));
        }
        if !regions.is_empty() {
            config.regions = Some(RegionCatalog::new(regions));
        }

        Ok(config)
    }

    /// Builds the run configuration this file describes.
    pub fn to_sync_config(&self) -> SyncConfig {
        let dispatch = if self.sync.sequential {
            DispatchPolicy::Sequential
        } else {
            DispatchPolicy::Concurrent {
                workers: self.sync.concurrency,
            }
        };

        let mut config = SyncConfig::new(&self.cache.directory)
            .with_url_template(self.provider.url_template.as_str())
            .with_storage_limit(self.cache.limit)
            .with_tile_cost(self.cache.tile_cost)
            .with_dispatch(dispatch);
        config.extension = self.provider.extension.clone();
        config.http_timeout_secs = self.provider.timeout_secs;
        config.provider_max_zoom = self.provider.max_zoom;
        config.zoom_cap = self.sync.zoom_cap;
        if let Some(catalog) = &self.regions {
            config.catalog = catalog.clone();
        }
        config
    }
}

/// Default tile cache directory.
///
/// Falls back to a relative `tiles/` directory on platforms without a
/// per-user cache location.
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join(APP_DIR_NAME).join("tiles"))
        .unwrap_or_else(|| PathBuf::from("tiles"))
}

fn invalid(section: &str, key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn parse_key<T: std::str::FromStr>(section: &str, key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| invalid(section, key, value))
}

/// Parses a human-readable size: `"8192"`, `"8KB"`, `"1.5GB"`.
///
/// Suffixes are binary multiples (KB = 1024) and case-insensitive; a
/// bare `B` suffix and fractional values are accepted.
pub fn parse_size(value: &str) -> Option<u64> {
    let value = value.trim();
    let split = value
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(value.len());
    let (number, suffix) = value.split_at(split);

    let number: f64 = number.trim().parse().ok()?;
    if number < 0.0 {
        return None;
    }
    let multiplier: u64 = match suffix.trim().to_ascii_uppercase().as_str() {
        "" | "B" => 1,
        "K" | "KB" => 1 << 10,
        "M" | "MB" => 1 << 20,
        "G" | "GB" => 1 << 30,
        "T" | "TB" => 1 << 40,
        _ => return None,
    };
    Some((number * multiplier as f64) as u64)
}

/// Formats a byte count with a binary-multiple suffix.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[unit])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}

/// Parses a bbox value: `min_lon, min_lat, max_lon, max_lat`.
fn parse_bbox(value: &str) -> Option<BoundingBox> {
    let parts: Vec<f64> = value
        .split(',')
        .map(|part| part.trim().parse().ok())
        .collect::<Option<Vec<f64>>>()?;
    if parts.len() != 4 {
        return None;
    }
    BoundingBox::new(parts[0], parts[1], parts[2], parts[3]).ok()
}

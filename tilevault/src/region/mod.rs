//! Region catalog
//!
//! A region is a named area of interest with a maximum zoom depth. The
//! catalog is an immutable ordered list of regions, built once at startup
//! and consulted by the tile planner. Regions may overlap; a tile covered
//! by several regions is still planned only once.
//!
//! The built-in catalog forms a zoom hierarchy over France: the whole
//! world at low zoom, the country at mid zoom, the Pays Basque sub-region,
//! and three city areas at full depth.

use crate::coord::{tile_touches, BoundingBox, CoordError, TileCoord};

/// Default margin, in degrees, applied around a city center point.
///
/// Roughly 2 km of longitude at French latitudes, enough to cover an
/// urban core at zoom 22 without ballooning the tile count.
pub const CITY_MARGIN_DEG: f64 = 0.02;

/// Zoom depth for the built-in world region.
const WORLD_ZOOM: u8 = 1;

/// Zoom depth for the built-in country region.
const FRANCE_ZOOM: u8 = 3;

/// Zoom depth for the built-in sub-region.
const PAYS_BASQUE_ZOOM: u8 = 5;

/// Zoom depth for the built-in city regions.
const CITY_ZOOM: u8 = 22;

/// A named area of interest with a maximum zoom depth to fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// Human-readable region name, used in logs and CLI listings.
    pub name: String,

    /// The geographic extent of interest.
    pub bbox: BoundingBox,

    /// Deepest zoom level to fetch for this region.
    pub max_zoom: u8,
}

impl Region {
    /// Creates a region from an explicit bounding box.
    pub fn new(name: impl Into<String>, bbox: BoundingBox, max_zoom: u8) -> Self {
        Self {
            name: name.into(),
            bbox,
            max_zoom,
        }
    }

    /// Creates a region as a square margin around a center point.
    ///
    /// # Arguments
    ///
    /// * `name` - Region name
    /// * `lon`, `lat` - Center point in degrees
    /// * `margin` - Half-width of the box on each axis, in degrees
    /// * `max_zoom` - Deepest zoom level to fetch
    pub fn around(
        name: impl Into<String>,
        lon: f64,
        lat: f64,
        margin: f64,
        max_zoom: u8,
    ) -> Result<Self, CoordError> {
        let bbox = BoundingBox::new(lon - margin, lat - margin, lon + margin, lat + margin)?;
        Ok(Self::new(name, bbox, max_zoom))
    }

    /// Whether this region wants the given tile.
    ///
    /// True when the region reaches the tile's zoom level and the tile
    /// touches the region's bounding box by a corner.
    #[inline]
    pub fn covers(&self, tile: TileCoord) -> bool {
        self.max_zoom >= tile.zoom && tile_touches(&self.bbox, tile)
    }
}

/// Immutable ordered collection of regions.
#[derive(Debug, Clone)]
pub struct RegionCatalog {
    regions: Vec<Region>,
}

impl RegionCatalog {
    /// Creates a catalog from an ordered region list.
    pub fn new(regions: Vec<Region>) -> Self {
        Self { regions }
    }

    /// The built-in France hierarchy.
    pub fn builtin() -> Self {
        // Infallible: all bounding boxes below are well-ordered constants.
        let world = Region::new("world", BoundingBox::world(), WORLD_ZOOM);
        let france = Region::new(
            "france",
            BoundingBox {
                min_lon: -5.1406,
                min_lat: 41.3337,
                max_lon: 9.5593,
                max_lat: 51.0890,
            },
            FRANCE_ZOOM,
        );
        let pays_basque = Region::new(
            "pays-basque",
            BoundingBox {
                min_lon: -1.898,
                min_lat: 43.139,
                max_lon: -1.166,
                max_lat: 43.582,
            },
            PAYS_BASQUE_ZOOM,
        );

        let mut regions = vec![world, france, pays_basque];
        for (name, lon, lat) in [
            ("bayonne", -1.4748, 43.4832),
            ("biarritz", -1.5586, 43.4715),
            ("anglet", -1.5177, 43.4782),
        ] {
            // Margins around fixed city centers cannot invert the box.
            if let Ok(city) = Region::around(name, lon, lat, CITY_MARGIN_DEG, CITY_ZOOM) {
                regions.push(city);
            }
        }

        Self::new(regions)
    }

    /// The regions in catalog order.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Number of regions in the catalog.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Whether the catalog holds no regions.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Deepest zoom level across all regions, or `None` when empty.
    pub fn max_zoom(&self) -> Option<u8> {
        self.regions.iter().map(|r| r.max_zoom).max()
    }

    /// Whether any region wants the given tile.
    #[inline]
    pub fn covers(&self, tile: TileCoord) -> bool {
        self.regions.iter().any(|r| r.covers(tile))
    }

    /// Looks up a region by name.
    pub fn get(&self, name: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.name == name)
    }

    /// Restricts the catalog to the named regions, preserving order.
    ///
    /// Unknown names are reported back so the CLI can reject typos
    /// instead of silently syncing nothing.
    pub fn select(&self, names: &[String]) -> Result<Self, Vec<String>> {
        let unknown: Vec<String> = names
            .iter()
            .filter(|n| self.get(n).is_none())
            .cloned()
            .collect();
        if !unknown.is_empty() {
            return Err(unknown);
        }
        let regions = self
            .regions
            .iter()
            .filter(|r| names.iter().any(|n| *n == r.name))
            .cloned()
            .collect();
        Ok(Self::new(regions))
    }
}

impl Default for RegionCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

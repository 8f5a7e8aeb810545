//! Coordinate conversion module
//!
//! Maps tile addresses to geographic bounds on the linear equirectangular
//! grid used by the tile service: longitude spans `[-180, 180]` across
//! `2^zoom` columns and latitude spans `[-90, 90]` across `2^zoom` rows.
//!
//! Note this is deliberately *not* spherical Mercator. The cache this crate
//! populates is consumed by tooling that expects the linear latitude
//! mapping, so the scheme must be preserved even though it diverges from
//! conventional slippy-map tiles at high latitudes.

mod types;

pub use types::{
    grid_size, BoundingBox, CoordError, TileCoord, MAX_LAT, MAX_LON, MAX_ZOOM, MIN_LAT, MIN_LON,
    MIN_ZOOM,
};

/// Converts a tile address to its geographic bounds.
///
/// The south-west corner of tile `(z, 0, 0)` is `(-180, -90)`; increasing
/// `x` moves east and increasing `y` moves north. Every tile at a zoom
/// level has identical angular width and height.
///
/// # Arguments
///
/// * `tile` - The tile address; indices are in range by construction
///
/// # Returns
///
/// The bounding box spanned by the tile.
#[inline]
pub fn tile_bounds(tile: TileCoord) -> BoundingBox {
    let n = grid_size(tile.zoom) as f64;

    let lon_span = MAX_LON - MIN_LON;
    let lat_span = MAX_LAT - MIN_LAT;

    let min_lon = tile.x as f64 / n * lon_span + MIN_LON;
    let max_lon = (tile.x + 1) as f64 / n * lon_span + MIN_LON;
    let min_lat = tile.y as f64 / n * lat_span + MIN_LAT;
    let max_lat = (tile.y + 1) as f64 / n * lat_span + MIN_LAT;

    BoundingBox {
        min_lon,
        min_lat,
        max_lon,
        max_lat,
    }
}

/// Tests whether a tile touches a bounding box by corner points.
///
/// A tile counts as intersecting when either of its south-west or
/// north-east corners falls inside the box, or either of the box's
/// corners falls inside the tile (all inclusive). The second direction
/// keeps a coarse tile selected when it fully contains a small box, so
/// low-zoom coverage is never lost above a city-sized region.
///
/// A tile that straddles the box with no corner contained either way is
/// still missed; callers accept that under-selection as a property of
/// the corner scheme.
#[inline]
pub fn tile_touches(bbox: &BoundingBox, tile: TileCoord) -> bool {
    let bounds = tile_bounds(tile);
    let (sw_lon, sw_lat) = bounds.south_west();
    let (ne_lon, ne_lat) = bounds.north_east();
    if bbox.contains(sw_lon, sw_lat) || bbox.contains(ne_lon, ne_lat) {
        return true;
    }

    let (box_sw_lon, box_sw_lat) = bbox.south_west();
    let (box_ne_lon, box_ne_lat) = bbox.north_east();
    bounds.contains(box_sw_lon, box_sw_lat) || bounds.contains(box_ne_lon, box_ne_lat)
}

//! Core coordinate types shared across the crate.

use std::fmt;

use thiserror::Error;

/// Minimum longitude in degrees.
pub const MIN_LON: f64 = -180.0;

/// Maximum longitude in degrees.
pub const MAX_LON: f64 = 180.0;

/// Minimum latitude in degrees.
pub const MIN_LAT: f64 = -90.0;

/// Maximum latitude in degrees.
pub const MAX_LAT: f64 = 90.0;

/// Minimum zoom level.
pub const MIN_ZOOM: u8 = 0;

/// Maximum zoom level supported by the tile grid.
///
/// City-level imagery tops out at 22 in practice; deeper levels would
/// still fit in `u32` tile indices but no provider serves them.
pub const MAX_ZOOM: u8 = 22;

/// Errors produced by coordinate construction and conversion.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordError {
    /// Longitude outside [-180, 180].
    #[error("invalid longitude: {0}")]
    InvalidLongitude(f64),

    /// Latitude outside [-90, 90].
    #[error("invalid latitude: {0}")]
    InvalidLatitude(f64),

    /// Zoom level beyond the supported grid depth.
    #[error("invalid zoom level: {0} (max: {MAX_ZOOM})")]
    InvalidZoom(u8),

    /// Tile index outside the grid at its zoom level.
    #[error("tile index ({x}, {y}) out of range at zoom {zoom}")]
    TileOutOfRange { x: u32, y: u32, zoom: u8 },

    /// Bounding box with min > max on an axis.
    #[error("degenerate bounding box: min ({min}) exceeds max ({max}) on {axis} axis")]
    DegenerateBBox {
        axis: &'static str,
        min: f64,
        max: f64,
    },
}

/// Address of a single tile in the quadtree grid.
///
/// At zoom level `z` the grid is `2^z × 2^z`; `x` counts columns from the
/// west edge, `y` counts rows from the south edge. Instances created via
/// [`TileCoord::new`] are always in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    /// Zoom level (0 to [`MAX_ZOOM`]).
    pub zoom: u8,

    /// Column index (0 to 2^zoom - 1, west to east).
    pub x: u32,

    /// Row index (0 to 2^zoom - 1, south to north).
    pub y: u32,
}

impl TileCoord {
    /// Creates a tile coordinate, validating index range for the zoom level.
    pub fn new(zoom: u8, x: u32, y: u32) -> Result<Self, CoordError> {
        if zoom > MAX_ZOOM {
            return Err(CoordError::InvalidZoom(zoom));
        }
        let n = grid_size(zoom);
        if x >= n || y >= n {
            return Err(CoordError::TileOutOfRange { x, y, zoom });
        }
        Ok(Self { zoom, x, y })
    }

    /// Creates a tile coordinate without range validation.
    ///
    /// Enumeration code that generates indices directly from the grid
    /// dimensions uses this to skip the redundant check.
    pub(crate) fn new_unchecked(zoom: u8, x: u32, y: u32) -> Self {
        debug_assert!(zoom <= MAX_ZOOM);
        debug_assert!(x < grid_size(zoom) && y < grid_size(zoom));
        Self { zoom, x, y }
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}

/// Returns the grid dimension (`2^zoom`) at a zoom level.
#[inline]
pub fn grid_size(zoom: u8) -> u32 {
    1u32 << zoom
}

/// Axis-aligned geographic rectangle in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Creates a bounding box, rejecting inverted axes and coordinates
    /// outside the world extent.
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Result<Self, CoordError> {
        for lon in [min_lon, max_lon] {
            if !(MIN_LON..=MAX_LON).contains(&lon) {
                return Err(CoordError::InvalidLongitude(lon));
            }
        }
        for lat in [min_lat, max_lat] {
            if !(MIN_LAT..=MAX_LAT).contains(&lat) {
                return Err(CoordError::InvalidLatitude(lat));
            }
        }
        if min_lon > max_lon {
            return Err(CoordError::DegenerateBBox {
                axis: "longitude",
                min: min_lon,
                max: max_lon,
            });
        }
        if min_lat > max_lat {
            return Err(CoordError::DegenerateBBox {
                axis: "latitude",
                min: min_lat,
                max: max_lat,
            });
        }
        Ok(Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        })
    }

    /// The full `[-180, 180] × [-90, 90]` extent.
    pub fn world() -> Self {
        Self {
            min_lon: MIN_LON,
            min_lat: MIN_LAT,
            max_lon: MAX_LON,
            max_lat: MAX_LAT,
        }
    }

    /// Inclusive containment test on both axes.
    ///
    /// A point exactly on an edge of the box is contained.
    #[inline]
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        self.min_lon <= lon && lon <= self.max_lon && self.min_lat <= lat && lat <= self.max_lat
    }

    /// South-west corner as `(lon, lat)`.
    #[inline]
    pub fn south_west(&self) -> (f64, f64) {
        (self.min_lon, self.min_lat)
    }

    /// North-east corner as `(lon, lat)`.
    #[inline]
    pub fn north_east(&self) -> (f64, f64) {
        (self.max_lon, self.max_lat)
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}] .. [{}, {}]",
            self.min_lon, self.min_lat, self.max_lon, self.max_lat
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_coord_valid() {
        let tile = TileCoord::new(3, 7, 0).unwrap();
        assert_eq!(tile.zoom, 3);
        assert_eq!(tile.x, 7);
        assert_eq!(tile.y, 0);
    }

    #[test]
    fn test_tile_coord_out_of_range() {
        let result = TileCoord::new(3, 8, 0);
        assert!(matches!(
            result,
            Err(CoordError::TileOutOfRange { x: 8, y: 0, zoom: 3 })
        ));
    }

    #[test]
    fn test_tile_coord_zoom_too_deep() {
        let result = TileCoord::new(MAX_ZOOM + 1, 0, 0);
        assert!(matches!(result, Err(CoordError::InvalidZoom(_))));
    }

    #[test]
    fn test_tile_coord_display() {
        let tile = TileCoord::new(5, 12, 9).unwrap();
        assert_eq!(tile.to_string(), "5/12/9");
    }

    #[test]
    fn test_grid_size() {
        assert_eq!(grid_size(0), 1);
        assert_eq!(grid_size(1), 2);
        assert_eq!(grid_size(10), 1024);
    }

    #[test]
    fn test_bbox_rejects_out_of_range_coordinates() {
        assert!(matches!(
            BoundingBox::new(-200.0, 0.0, 0.0, 1.0),
            Err(CoordError::InvalidLongitude(_))
        ));
        assert!(matches!(
            BoundingBox::new(0.0, -91.0, 1.0, 1.0),
            Err(CoordError::InvalidLatitude(_))
        ));
    }

    #[test]
    fn test_bbox_rejects_inverted_longitude() {
        let result = BoundingBox::new(10.0, 0.0, -10.0, 1.0);
        assert!(matches!(
            result,
            Err(CoordError::DegenerateBBox { axis: "longitude", .. })
        ));
    }

    #[test]
    fn test_bbox_rejects_inverted_latitude() {
        let result = BoundingBox::new(0.0, 5.0, 1.0, -5.0);
        assert!(matches!(
            result,
            Err(CoordError::DegenerateBBox { axis: "latitude", .. })
        ));
    }

    #[test]
    fn test_bbox_contains_inclusive_edges() {
        let bbox = BoundingBox::new(-1.0, -1.0, 1.0, 1.0).unwrap();

        // All four corners and edge midpoints are contained
        assert!(bbox.contains(-1.0, -1.0));
        assert!(bbox.contains(1.0, 1.0));
        assert!(bbox.contains(-1.0, 1.0));
        assert!(bbox.contains(1.0, -1.0));
        assert!(bbox.contains(0.0, 1.0));
        assert!(bbox.contains(-1.0, 0.0));

        // Just outside is not
        assert!(!bbox.contains(1.0001, 0.0));
        assert!(!bbox.contains(0.0, -1.0001));
    }

    #[test]
    fn test_world_bbox_contains_poles_and_antimeridian() {
        let world = BoundingBox::world();
        assert!(world.contains(-180.0, -90.0));
        assert!(world.contains(180.0, 90.0));
        assert!(world.contains(0.0, 0.0));
    }
}

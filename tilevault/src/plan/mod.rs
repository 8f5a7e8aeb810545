//! Tile enumeration
//!
//! [`TilePlan`] walks the tile grid breadth-first by resolution: all of
//! zoom 0, then all of zoom 1, and so on, yielding the tiles wanted by at
//! least one catalog region. Within a zoom level tiles are ordered by `x`
//! then `y`.
//!
//! The ordering is load-bearing. Coarse tiles are dispatched before fine
//! ones, so a run that stops on budget exhaustion still holds complete
//! low-zoom coverage; the cutoff can only punch holes at the deepest
//! zoom level reached.
//!
//! Each grid level is scanned exactly once, so a tile wanted by several
//! overlapping regions is yielded exactly once; deduplication is a
//! property of the scan, not a bookkeeping table.

use crate::coord::{grid_size, TileCoord};
use crate::region::RegionCatalog;

/// Lazy breadth-first enumeration of the tiles a catalog wants.
///
/// Construct with [`TilePlan::new`] and iterate. The full grid at each
/// zoom level is tested against the catalog, which makes deep zoom levels
/// expensive to walk; the planner itself holds no per-tile state.
#[derive(Debug, Clone)]
pub struct TilePlan<'a> {
    catalog: &'a RegionCatalog,
    /// Deepest zoom level to enumerate (inclusive).
    max_zoom: u8,
    /// Cursor position; `None` once exhausted.
    cursor: Option<Cursor>,
}

#[derive(Debug, Clone, Copy)]
struct Cursor {
    zoom: u8,
    x: u32,
    y: u32,
}

impl<'a> TilePlan<'a> {
    /// Plans every tile the catalog wants, to the catalog's full depth.
    pub fn new(catalog: &'a RegionCatalog) -> Self {
        let max_zoom = catalog.max_zoom();
        Self {
            catalog,
            max_zoom: max_zoom.unwrap_or(0),
            cursor: max_zoom.map(|_| Cursor { zoom: 0, x: 0, y: 0 }),
        }
    }

    /// Plans with the enumeration depth clamped to `cap`.
    ///
    /// Regions deeper than the cap are truncated; regions shallower are
    /// unaffected.
    pub fn with_zoom_cap(catalog: &'a RegionCatalog, cap: u8) -> Self {
        let mut plan = Self::new(catalog);
        plan.max_zoom = plan.max_zoom.min(cap);
        plan
    }

    /// The deepest zoom level this plan will enumerate.
    pub fn max_zoom(&self) -> u8 {
        self.max_zoom
    }

    /// Advances the cursor one grid position in (zoom, x, y) order.
    fn advance(&mut self) {
        let Some(mut cur) = self.cursor else {
            return;
        };
        let n = grid_size(cur.zoom);
        cur.y += 1;
        if cur.y == n {
            cur.y = 0;
            cur.x += 1;
            if cur.x == n {
                cur.x = 0;
                if cur.zoom == self.max_zoom {
                    self.cursor = None;
                    return;
                }
                cur.zoom += 1;
            }
        }
        self.cursor = Some(cur);
    }
}

impl Iterator for TilePlan<'_> {
    type Item = TileCoord;

    fn next(&mut self) -> Option<TileCoord> {
        loop {
            let cur = self.cursor?;
            let tile = TileCoord::new_unchecked(cur.zoom, cur.x, cur.y);
            self.advance();
            if self.catalog.covers(tile) {
                return Some(tile);
            }
        }
    }
}

/// Per-zoom candidate counts for a plan, used by dry runs.
#[derive(Debug, Clone, Default)]
pub struct PlanSummary {
    /// `(zoom, tile count)` pairs in ascending zoom order.
    pub per_zoom: Vec<(u8, u64)>,
}

impl PlanSummary {
    /// Counts the planned tiles per zoom level.
    ///
    /// Walks the full plan; at deep zoom levels this is as expensive as
    /// the enumeration itself, so the CLI caps the zoom for dry runs.
    pub fn compute(catalog: &RegionCatalog, zoom_cap: u8) -> Self {
        let mut per_zoom: Vec<(u8, u64)> = Vec::new();
        for tile in TilePlan::with_zoom_cap(catalog, zoom_cap) {
            match per_zoom.last_mut() {
                Some((zoom, count)) if *zoom == tile.zoom => *count += 1,
                _ => per_zoom.push((tile.zoom, 1)),
            }
        }
        Self { per_zoom }
    }

    /// Total tiles across all zoom levels.
    pub fn total(&self) -> u64 {
        self.per_zoom.iter().map(|(_, count)| count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::BoundingBox;
    use crate::region::Region;

    fn world_catalog(max_zoom: u8) -> RegionCatalog {
        RegionCatalog::new(vec![Region::new("world", BoundingBox::world(), max_zoom)])
    }

    #[test]
    fn test_world_at_zoom_one_yields_five_tiles() {
        let catalog = world_catalog(1);
        let tiles: Vec<TileCoord> = TilePlan::new(&catalog).collect();

        let expected: Vec<TileCoord> = [(0, 0, 0), (1, 0, 0), (1, 0, 1), (1, 1, 0), (1, 1, 1)]
            .into_iter()
            .map(|(z, x, y)| TileCoord::new(z, x, y).unwrap())
            .collect();
        assert_eq!(tiles, expected);
    }

    #[test]
    fn test_small_region_includes_world_tile() {
        let catalog = RegionCatalog::new(vec![Region::new(
            "small",
            BoundingBox::new(-1.0, -1.0, 1.0, 1.0).unwrap(),
            3,
        )]);
        let tiles: Vec<TileCoord> = TilePlan::new(&catalog).collect();
        assert!(tiles.contains(&TileCoord::new(0, 0, 0).unwrap()));
    }

    #[test]
    fn test_small_region_excludes_far_tiles_at_depth() {
        let catalog = RegionCatalog::new(vec![Region::new(
            "small",
            BoundingBox::new(-1.0, -1.0, 1.0, 1.0).unwrap(),
            3,
        )]);
        let tiles: Vec<TileCoord> = TilePlan::new(&catalog).collect();

        for tile in &tiles {
            if tile.zoom == 3 {
                let bounds = crate::coord::tile_bounds(*tile);
                let outside = bounds.max_lon < -1.0
                    || bounds.min_lon > 1.0
                    || bounds.max_lat < -1.0
                    || bounds.min_lat > 1.0;
                assert!(!outside, "planned tile {} lies wholly outside the region", tile);
            }
        }
    }

    #[test]
    fn test_overlapping_regions_yield_each_tile_once() {
        // Two identical regions; every covered tile must appear once.
        let bbox = BoundingBox::new(-10.0, -10.0, 10.0, 10.0).unwrap();
        let catalog = RegionCatalog::new(vec![
            Region::new("a", bbox, 2),
            Region::new("b", bbox, 2),
        ]);

        let tiles: Vec<TileCoord> = TilePlan::new(&catalog).collect();
        let mut seen = std::collections::HashSet::new();
        for tile in &tiles {
            assert!(seen.insert(*tile), "tile {} planned twice", tile);
        }
    }

    #[test]
    fn test_ordering_breadth_first_then_x_then_y() {
        let catalog = world_catalog(2);
        let tiles: Vec<TileCoord> = TilePlan::new(&catalog).collect();

        for pair in tiles.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let key_a = (a.zoom, a.x, a.y);
            let key_b = (b.zoom, b.x, b.y);
            assert!(key_a < key_b, "ordering violated: {} before {}", a, b);
        }
    }

    #[test]
    fn test_zoom_cap_truncates_deep_regions() {
        let catalog = world_catalog(5);
        let plan = TilePlan::with_zoom_cap(&catalog, 2);
        assert_eq!(plan.max_zoom(), 2);
        assert!(plan.last().unwrap().zoom <= 2);
    }

    #[test]
    fn test_zoom_cap_above_catalog_depth_is_inert() {
        let catalog = world_catalog(1);
        let plan = TilePlan::with_zoom_cap(&catalog, 10);
        assert_eq!(plan.max_zoom(), 1);
    }

    #[test]
    fn test_empty_catalog_plans_nothing() {
        let catalog = RegionCatalog::new(vec![]);
        assert_eq!(TilePlan::new(&catalog).count(), 0);
    }

    #[test]
    fn test_summary_counts_match_plan() {
        let catalog = world_catalog(2);
        let summary = PlanSummary::compute(&catalog, 2);

        assert_eq!(summary.per_zoom, vec![(0, 1), (1, 4), (2, 16)]);
        assert_eq!(summary.total(), 21);
    }

    // Property-based tests using proptest
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(32))]

            #[test]
            fn test_plan_zoom_never_decreases(max_zoom in 0u8..=4) {
                let catalog = world_catalog(max_zoom);
                let mut last_zoom = 0u8;
                for tile in TilePlan::new(&catalog) {
                    prop_assert!(tile.zoom >= last_zoom);
                    last_zoom = tile.zoom;
                }
            }

            #[test]
            fn test_world_plan_is_complete_per_level(max_zoom in 0u8..=4) {
                // A world region wants every tile at every level, so the
                // count per level must be the full grid.
                let catalog = world_catalog(max_zoom);
                let summary = PlanSummary::compute(&catalog, max_zoom);
                for (zoom, count) in summary.per_zoom {
                    prop_assert_eq!(count, (grid_size(zoom) as u64).pow(2));
                }
            }
        }
    }
}

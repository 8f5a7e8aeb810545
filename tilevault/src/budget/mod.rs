//! Storage budget tracking
//!
//! The budget charges a fixed nominal cost per stored tile rather than
//! the actual response size. Accounting stays a single atomic add per
//! tile, and the cap reads as "roughly N bytes of tiles" instead of an
//! exact disk measurement.
//!
//! The counter only ever grows within a run; once the limit is exceeded
//! every subsequent check reports exhaustion.

use std::sync::atomic::{AtomicU64, Ordering};

/// Accumulates per-tile storage cost against a byte limit.
///
/// Safe to share across concurrent fetch completions; the consumed
/// counter is a single atomic accumulator.
#[derive(Debug)]
pub struct StorageBudget {
    /// Budget cap in bytes.
    limit: u64,

    /// Nominal bytes charged per stored tile.
    tile_cost: u64,

    /// Bytes charged so far. Monotonically non-decreasing.
    consumed: AtomicU64,
}

impl StorageBudget {
    /// Creates a budget with the given cap and per-tile accounting cost.
    pub fn new(limit: u64, tile_cost: u64) -> Self {
        Self {
            limit,
            tile_cost,
            consumed: AtomicU64::new(0),
        }
    }

    /// Charges one tile and reports whether the budget still holds.
    ///
    /// Returns `true` while the accumulated cost is within the limit and
    /// `false` from the first record that pushes it over. The tracker
    /// never resets mid-run.
    pub fn record(&self) -> bool {
        let consumed = self.consumed.fetch_add(self.tile_cost, Ordering::SeqCst) + self.tile_cost;
        consumed <= self.limit
    }

    /// Whether the accumulated cost has exceeded the limit.
    pub fn exhausted(&self) -> bool {
        self.consumed.load(Ordering::SeqCst) > self.limit
    }

    /// Bytes charged so far.
    pub fn consumed(&self) -> u64 {
        self.consumed.load(Ordering::SeqCst)
    }

    /// The configured byte cap.
    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// The nominal bytes charged per tile.
    pub fn tile_cost(&self) -> u64 {
        self.tile_cost
    }
}

//! Result and event types for the sync orchestrator.

use std::fmt;

use crate::coord::TileCoord;

/// Per-tile result of a fetch-and-store attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The tile was downloaded and written; `bytes` is the body size.
    Fetched { bytes: u64 },

    /// The service has no tile at this address. Skipped.
    Missing,

    /// Connection-level failure or a local write failure. Skipped; the
    /// tile may exist and a later run can pick it up.
    Failed,
}

/// Why a run ended.
///
/// Every variant is a successful exit; budget cutoff is an expected
/// outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The enumeration was drained to completion.
    Completed,

    /// The storage budget was exceeded and dispatch stopped early.
    BudgetExhausted,

    /// The run was cancelled from outside (Ctrl-C).
    Cancelled,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Completed => write!(f, "completed"),
            StopReason::BudgetExhausted => write!(f, "budget exhausted"),
            StopReason::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Aggregate outcome of a sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    /// Tiles downloaded and written.
    pub tiles_fetched: u64,

    /// Tiles the service reported as absent.
    pub tiles_missing: u64,

    /// Tiles skipped on network or write failure.
    pub tiles_failed: u64,

    /// Nominal bytes charged against the budget.
    pub bytes_recorded: u64,

    /// Why the run ended.
    pub stop_reason: StopReason,
}

impl SyncReport {
    /// Total tiles attempted.
    pub fn tiles_attempted(&self) -> u64 {
        self.tiles_fetched + self.tiles_missing + self.tiles_failed
    }
}

/// Progress events emitted while a run is in flight.
///
/// Consumed by the CLI progress display; the orchestrator never blocks
/// on the channel.
#[derive(Debug, Clone, Copy)]
pub enum SyncEvent {
    /// A tile attempt finished with the given outcome.
    TileCompleted {
        tile: TileCoord,
        outcome: FetchOutcome,
    },

    /// The budget tracker reported exhaustion; dispatch is stopping.
    BudgetExhausted { consumed: u64, limit: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_attempted_sums_all_outcomes() {
        let report = SyncReport {
            tiles_fetched: 5,
            tiles_missing: 2,
            tiles_failed: 1,
            bytes_recorded: 40,
            stop_reason: StopReason::Completed,
        };
        assert_eq!(report.tiles_attempted(), 8);
    }

    #[test]
    fn test_stop_reason_display() {
        assert_eq!(StopReason::BudgetExhausted.to_string(), "budget exhausted");
    }
}

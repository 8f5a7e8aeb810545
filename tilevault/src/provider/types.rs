//! Provider trait and error taxonomy.

use std::future::Future;

use thiserror::Error;

use crate::coord::TileCoord;

/// Errors produced while fetching a tile from a provider.
///
/// The taxonomy mirrors how the sync loop treats each case: `Missing` and
/// `Transient` are per-tile skips, never fatal; `UnsupportedZoom` and
/// `BadTemplate` are configuration mistakes surfaced at dispatch time.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// The service answered with a non-success status; the tile does not
    /// exist at this address. Skipped silently.
    #[error("tile not available: HTTP {status} from {url}")]
    Missing { status: u16, url: String },

    /// Connection-level failure: refused, reset, DNS, timeout. A retry
    /// policy could distinguish these; the baseline treats them as skips.
    #[error("transient network failure: {0}")]
    Transient(String),

    /// The provider does not serve tiles at this zoom level.
    #[error("unsupported zoom level: {0}")]
    UnsupportedZoom(u8),

    /// The URL template is missing a required placeholder.
    #[error("URL template is missing the {0} placeholder")]
    BadTemplate(&'static str),

    /// The HTTP client could not be constructed.
    #[error("failed to create HTTP client: {0}")]
    ClientCreation(String),
}

impl ProviderError {
    /// Whether the failure is connection-level rather than a definitive
    /// not-found answer from the service.
    pub fn is_transient(&self) -> bool {
        matches!(self, ProviderError::Transient(_))
    }
}

/// A source of tile images addressed by tile coordinates.
///
/// Implementations perform a single-attempt fetch: no authentication, no
/// rate limiting, no retry. The returned bytes are treated as an opaque
/// blob and written to the store verbatim.
pub trait TileProvider: Send + Sync {
    /// Fetches the image bytes for one tile.
    fn fetch_tile(
        &self,
        tile: TileCoord,
    ) -> impl Future<Output = Result<Vec<u8>, ProviderError>> + Send;

    /// Provider name for logs and diagnostics.
    fn name(&self) -> &str;

    /// Deepest zoom level the provider serves.
    fn max_zoom(&self) -> u8;

    /// Whether the provider serves tiles at the given zoom level.
    fn supports_zoom(&self, zoom: u8) -> bool {
        zoom <= self.max_zoom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_is_not_transient() {
        let err = ProviderError::Missing {
            status: 404,
            url: "http://example.com/1/2/3.png".to_string(),
        };
        assert!(!err.is_transient());
        assert!(err.to_string().contains("404"));
    }

    #[test]
    fn test_transient_is_transient() {
        let err = ProviderError::Transient("connection refused".to_string());
        assert!(err.is_transient());
    }
}

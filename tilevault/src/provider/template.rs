//! URL-template tile provider.
//!
//! Most public basemap services expose tiles behind a URL of the shape
//! `https://host/path/{z}/{x}/{y}.png`. [`TemplateProvider`] substitutes
//! the tile address into such a template and issues a single GET per tile.
//!
//! The template must contain all three placeholders; this is validated at
//! construction so a typo fails the run before any tile is dispatched.

use crate::coord::TileCoord;
use crate::provider::{AsyncHttpClient, ProviderError, TileProvider};

/// Placeholder for the zoom level in a URL template.
const PLACEHOLDER_ZOOM: &str = "{z}";

/// Placeholder for the tile column in a URL template.
const PLACEHOLDER_X: &str = "{x}";

/// Placeholder for the tile row in a URL template.
const PLACEHOLDER_Y: &str = "{y}";

/// Tile provider backed by a `{z}/{x}/{y}` URL template.
///
/// # Example
///
/// ```ignore
/// use tilevault::provider::{ReqwestClient, TemplateProvider};
///
/// let client = ReqwestClient::new()?;
/// let provider = TemplateProvider::new(
///     client,
///     "http://a.basemaps.cartocdn.com/light_all/{z}/{x}/{y}.png",
///     22,
/// )?;
/// ```
pub struct TemplateProvider<C: AsyncHttpClient> {
    http_client: C,
    template: String,
    max_zoom: u8,
}

impl<C: AsyncHttpClient> TemplateProvider<C> {
    /// Creates a provider from a URL template.
    ///
    /// # Arguments
    ///
    /// * `http_client` - HTTP client for making requests
    /// * `template` - URL containing `{z}`, `{x}` and `{y}` placeholders
    /// * `max_zoom` - Deepest zoom level the service offers
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::BadTemplate`] when a placeholder is
    /// missing from the template.
    pub fn new(
        http_client: C,
        template: impl Into<String>,
        max_zoom: u8,
    ) -> Result<Self, ProviderError> {
        let template = template.into();
        for placeholder in [PLACEHOLDER_ZOOM, PLACEHOLDER_X, PLACEHOLDER_Y] {
            if !template.contains(placeholder) {
                return Err(ProviderError::BadTemplate(placeholder));
            }
        }
        Ok(Self {
            http_client,
            template,
            max_zoom,
        })
    }

    /// Builds the tile URL for the given address.
    fn build_url(&self, tile: TileCoord) -> String {
        self.template
            .replace(PLACEHOLDER_ZOOM, &tile.zoom.to_string())
            .replace(PLACEHOLDER_X, &tile.x.to_string())
            .replace(PLACEHOLDER_Y, &tile.y.to_string())
    }
}

impl<C: AsyncHttpClient> TileProvider for TemplateProvider<C> {
    async fn fetch_tile(&self, tile: TileCoord) -> Result<Vec<u8>, ProviderError> {
        if !self.supports_zoom(tile.zoom) {
            return Err(ProviderError::UnsupportedZoom(tile.zoom));
        }

        let url = self.build_url(tile);
        self.http_client.get(&url).await
    }

    fn name(&self) -> &str {
        "template"
    }

    fn max_zoom(&self) -> u8 {
        self.max_zoom
    }
}

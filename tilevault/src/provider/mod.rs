//! Tile provider abstraction
//!
//! This module provides traits and implementations for downloading map
//! tiles from tiled-imagery HTTP services. The only concrete provider is
//! [`TemplateProvider`], which covers every service reachable through a
//! `{z}/{x}/{y}` URL template; the [`AsyncHttpClient`] seam keeps it
//! testable without a network.

mod http;
mod template;
mod types;

pub use http::{AsyncHttpClient, ReqwestClient};
pub use template::TemplateProvider;
pub use types::{ProviderError, TileProvider};

#[cfg(test)]
pub use http::tests::MockHttpClient;

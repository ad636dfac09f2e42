//! HTTP surface: routing, shared state, CORS, and error mapping.
//!
//! Endpoints:
//!
//! - `GET /discover?url=<site>` — feed discovery
//! - `GET /rss?url=<feedUrl>&debug=<bool>&bypassCache=<bool>` — normalized feed
//! - `GET /image-proxy?url=<imageUrl>&width=&height=&quality=&format=` — image passthrough
//!
//! Every endpoint allows any origin; preflight `OPTIONS` is answered by the
//! CORS layer.

mod discover;
pub mod error;
mod image;
mod rss;

pub use image::ImageProxy;

use crate::config::Config;
use crate::discovery::DiscoveryService;
use crate::feed::FeedService;
use crate::fetch::Fetcher;
use crate::util::Clock;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared state handed to every handler.
pub struct AppState {
    pub discovery: DiscoveryService,
    pub feeds: FeedService,
    pub images: ImageProxy,
}

impl AppState {
    pub fn new(config: &Config, fetcher: Arc<Fetcher>, clock: Arc<dyn Clock>) -> Self {
        Self {
            discovery: DiscoveryService::new(fetcher.clone(), config),
            feeds: FeedService::new(fetcher.clone(), clock, config),
            images: ImageProxy::new(fetcher, config),
        }
    }
}

/// Builds the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/discover", get(discover::handle))
        .route("/rss", get(rss::handle))
        .route("/image-proxy", get(image::handle))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

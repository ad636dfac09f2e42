//! `GET /image-proxy` — fetch an image on a client's behalf.
//!
//! Exists so feed readers can load article images from hosts that refuse
//! cross-origin or referer-less requests; the per-domain header recipes in
//! [`crate::fetch`] do the convincing. This is a passthrough proxy: the
//! resize parameters (`width`/`height`/`quality`/`format`) are accepted and
//! participate in the cache key, but no transcoding happens here —
//! processing belongs to an external collaborator.

use super::error::ApiError;
use super::AppState;
use crate::cache::TtlCache;
use crate::config::Config;
use crate::fetch::{FetchError, Fetcher};
use axum::extract::{Query, State};
use axum::http::{header, HeaderName, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

const IMAGE_ACCEPT: &str = "image/webp,image/apng,image/*,*/*;q=0.8";
const X_CACHE: HeaderName = HeaderName::from_static("x-cache");

#[derive(Debug, Deserialize)]
pub struct ImageQuery {
    url: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    quality: Option<u8>,
    format: Option<String>,
}

impl ImageQuery {
    /// Cache key over the full parameter tuple, so a future processing
    /// collaborator can vary output per parameter set without key clashes.
    fn cache_key(&self, url: &str) -> String {
        format!(
            "{url}-{}-{}-{}-{}",
            self.width.map(|v| v.to_string()).unwrap_or_default(),
            self.height.map(|v| v.to_string()).unwrap_or_default(),
            self.quality.unwrap_or(80),
            self.format.as_deref().unwrap_or_default(),
        )
    }
}

/// A proxied image held in cache.
#[derive(Debug, Clone)]
pub struct CachedImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Fetches and caches upstream images.
pub struct ImageProxy {
    fetcher: Arc<Fetcher>,
    cache: Mutex<TtlCache<String, CachedImage>>,
    timeout: Duration,
}

impl ImageProxy {
    pub fn new(fetcher: Arc<Fetcher>, config: &Config) -> Self {
        Self {
            fetcher,
            cache: Mutex::new(TtlCache::new(
                config.image_cache_capacity,
                Duration::from_secs(config.image_cache_ttl_secs),
            )),
            timeout: config.image_timeout(),
        }
    }

    /// Returns the image and whether it came from cache.
    async fn fetch(&self, url: &str, key: String) -> Result<(CachedImage, bool), ApiError> {
        if let Some(cached) = self.cache.lock().await.get(&key) {
            return Ok((cached, true));
        }

        let body = self
            .fetcher
            .get(url, IMAGE_ACCEPT, self.timeout)
            .await
            .map_err(|e| match e {
                FetchError::Timeout => ApiError::UpstreamTimeout,
                other => ApiError::Internal(other.to_string()),
            })?;

        if !body.is_success() {
            return Err(ApiError::Upstream(body.status));
        }

        let image = CachedImage {
            content_type: body
                .content_type
                .clone()
                .unwrap_or_else(|| "image/jpeg".to_owned()),
            bytes: body.bytes,
        };

        self.cache.lock().await.insert(key, image.clone());
        Ok((image, false))
    }
}

/// Proxies the image at `url`, with long-lived client caching headers.
pub async fn handle(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ImageQuery>,
) -> Result<Response, ApiError> {
    let url = query
        .url
        .clone()
        .filter(|u| !u.trim().is_empty())
        .ok_or(ApiError::MissingParam("url"))?;

    let key = query.cache_key(&url);
    let (image, hit) = state.images.fetch(&url, key).await?;

    let cache_state = if hit { "HIT" } else { "MISS" };
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, image.content_type),
            (
                header::CACHE_CONTROL,
                "public, max-age=86400".to_owned(),
            ),
            (X_CACHE, cache_state.to_owned()),
        ],
        image.bytes,
    )
        .into_response())
}

//! Feed retrieval and normalization.
//!
//! [`normalize`] turns raw RSS/Atom bytes into the canonical
//! [`FeedResponse`] schema; [`FeedService`] wraps it with the fetch step,
//! host-specific Accept headers, and a short-TTL response cache. Unlike the
//! discovery strategies, fetch failures here are surfaced to the caller —
//! upstream HTTP status codes propagate verbatim.

mod normalize;

pub use normalize::{normalize, FeedItem, FeedResponse, FeedType, NormalizeError};

use crate::cache::TtlCache;
use crate::config::Config;
use crate::fetch::{FetchError, Fetcher};
use crate::util::Clock;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use url::Url;

/// Errors surfaced by feed retrieval.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Upstream answered with a non-2xx status; propagated verbatim.
    #[error("upstream returned status {0}")]
    UpstreamStatus(u16),
    /// The fetch exceeded its time budget.
    #[error("timed out while fetching feed")]
    UpstreamTimeout,
    /// Network-level failure before any status was received.
    #[error("failed to fetch feed: {0}")]
    Fetch(String),
    /// The feed parsed but contains no entries.
    #[error("no articles found in feed")]
    NoArticles,
    /// The document is not parseable as RSS or Atom.
    #[error("failed to parse feed: {0}")]
    Parse(String),
}

/// Fetches, normalizes, and caches feeds.
pub struct FeedService {
    fetcher: Arc<Fetcher>,
    cache: Mutex<TtlCache<String, FeedResponse>>,
    clock: Arc<dyn Clock>,
    timeout: Duration,
}

impl FeedService {
    pub fn new(fetcher: Arc<Fetcher>, clock: Arc<dyn Clock>, config: &Config) -> Self {
        Self {
            fetcher,
            cache: Mutex::new(TtlCache::new(
                config.feed_cache_capacity,
                Duration::from_secs(config.feed_cache_ttl_secs),
            )),
            clock,
            timeout: config.feed_timeout(),
        }
    }

    /// Retrieves and normalizes the feed at `feed_url`.
    ///
    /// `bypass_cache` skips the cache read but still stores the fresh
    /// result. `debug` turns on verbose logging for this request only.
    pub async fn fetch_feed(
        &self,
        feed_url: &str,
        debug: bool,
        bypass_cache: bool,
    ) -> Result<FeedResponse, FeedError> {
        if !bypass_cache {
            if let Some(cached) = self.cache.lock().await.get(&feed_url.to_owned()) {
                if debug {
                    tracing::debug!(feed = %feed_url, "Serving feed from cache");
                }
                return Ok(cached);
            }
        }

        let host = Url::parse(feed_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_owned))
            .unwrap_or_default();
        let accept = self.fetcher.policy().feed_accept(&host);

        let body = self
            .fetcher
            .get(feed_url, accept, self.timeout)
            .await
            .map_err(|e| match e {
                FetchError::Timeout => FeedError::UpstreamTimeout,
                other => FeedError::Fetch(other.to_string()),
            })?;

        if !body.is_success() {
            return Err(FeedError::UpstreamStatus(body.status));
        }

        if debug {
            tracing::debug!(
                feed = %feed_url,
                content_type = ?body.content_type,
                bytes = body.bytes.len(),
                "Feed retrieved"
            );
        }

        let normalized =
            normalize(&body.bytes, feed_url, self.clock.as_ref()).map_err(|e| match e {
                NormalizeError::NoArticles => FeedError::NoArticles,
                NormalizeError::Parse(msg) => FeedError::Parse(msg),
            })?;

        tracing::info!(feed = %feed_url, items = normalized.items.len(), "Feed normalized");
        self.cache
            .lock()
            .await
            .insert(feed_url.to_owned(), normalized.clone());

        Ok(normalized)
    }
}

//! Feed discovery: find RSS/Atom feeds for an arbitrary website.
//!
//! Three strategies run in strict priority order, each one only when every
//! strategy before it came back empty:
//!
//! 1. [`autodiscovery`] — `<link>` hints in the site's home-page markup
//! 2. [`common_paths`] — concurrent HEAD probes of conventional feed paths
//! 3. [`known_domains`] — a static hostname → feed URL table
//!
//! Results are deduplicated by URL (first occurrence wins) and cached per
//! site root. An empty candidate list is a valid, cacheable outcome, not an
//! error.

mod autodiscovery;
mod common_paths;
mod known_domains;

use crate::cache::TtlCache;
use crate::config::Config;
use crate::fetch::Fetcher;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use url::Url;

/// Which strategy produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedSource {
    Autodiscovery,
    CommonPath,
    KnownDomain,
}

/// A feed discovered for a site. Immutable once produced; `url` is the
/// uniqueness key for deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedCandidate {
    pub url: String,
    pub source: FeedSource,
    pub title: String,
}

/// Complete discovery outcome for one site root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryResult {
    pub feeds: Vec<FeedCandidate>,
    pub site: String,
}

/// Errors the orchestrator itself can raise. Strategy failures never
/// surface here — they degrade to empty candidate lists.
#[derive(Debug, Error)]
pub enum DiscoverError {
    #[error("invalid site URL: {0}")]
    InvalidUrl(String),
}

/// Runs the strategy pipeline and owns the per-site discovery cache.
pub struct DiscoveryService {
    fetcher: Arc<Fetcher>,
    cache: Mutex<TtlCache<String, DiscoveryResult>>,
    discovery_timeout: Duration,
    probe_timeout: Duration,
    known_domains: &'static [(&'static str, &'static str)],
}

impl DiscoveryService {
    pub fn new(fetcher: Arc<Fetcher>, config: &Config) -> Self {
        Self {
            fetcher,
            cache: Mutex::new(TtlCache::new(
                config.discovery_cache_capacity,
                Duration::from_secs(config.discovery_cache_ttl_secs),
            )),
            discovery_timeout: config.discovery_timeout(),
            probe_timeout: config.probe_timeout(),
            known_domains: known_domains::KNOWN_DOMAINS,
        }
    }

    /// Replaces the known-domain table. The table is policy, not algorithm;
    /// tests inject their own entries through this.
    pub fn with_known_domains(
        mut self,
        table: &'static [(&'static str, &'static str)],
    ) -> Self {
        self.known_domains = table;
        self
    }

    /// Discovers feeds for `raw_url`, consulting the cache first.
    ///
    /// The input is normalized to a site root (`scheme://host`, path and
    /// query discarded) before anything else: discovery is always
    /// site-wide. A cached result is returned unchanged — the cache is the
    /// final authority within its TTL.
    pub async fn discover(&self, raw_url: &str) -> Result<DiscoveryResult, DiscoverError> {
        let (site_root, hostname) = normalize_site(raw_url)?;

        if let Some(cached) = self.cache.lock().await.get(&site_root) {
            tracing::debug!(site = %site_root, "Serving discovery result from cache");
            return Ok(cached);
        }

        let feeds = self.run_strategies(&site_root, &hostname).await;
        let result = DiscoveryResult {
            feeds: dedup_by_url(feeds),
            site: site_root.clone(),
        };

        tracing::info!(site = %site_root, feeds = result.feeds.len(), "Discovery complete");
        self.cache.lock().await.insert(site_root, result.clone());
        Ok(result)
    }

    /// Strict short-circuit: a later strategy runs only when everything
    /// before it found nothing.
    async fn run_strategies(&self, site_root: &str, hostname: &str) -> Vec<FeedCandidate> {
        let feeds = autodiscovery::find_feeds(
            &self.fetcher,
            site_root,
            hostname,
            self.discovery_timeout,
        )
        .await;
        if !feeds.is_empty() {
            return feeds;
        }

        let feeds =
            common_paths::find_feeds(&self.fetcher, site_root, hostname, self.probe_timeout).await;
        if !feeds.is_empty() {
            return feeds;
        }

        known_domains::find_feeds(self.known_domains, hostname)
    }
}

/// Normalizes a raw user-supplied URL into `(site_root, hostname)`.
///
/// A missing scheme defaults to `https://`; path and query are discarded.
/// A non-default port stays in the site root (probes must reach the same
/// listener) but not in the hostname used for titles and domain matching.
fn normalize_site(raw_url: &str) -> Result<(String, String), DiscoverError> {
    let trimmed = raw_url.trim();
    let with_scheme = if trimmed.starts_with("http") {
        trimmed.to_owned()
    } else {
        format!("https://{trimmed}")
    };

    let parsed =
        Url::parse(&with_scheme).map_err(|e| DiscoverError::InvalidUrl(e.to_string()))?;
    let hostname = parsed
        .host_str()
        .ok_or_else(|| DiscoverError::InvalidUrl(format!("no host in {with_scheme}")))?
        .to_owned();

    let site_root = match parsed.port() {
        Some(port) => format!("{}://{}:{}", parsed.scheme(), hostname, port),
        None => format!("{}://{}", parsed.scheme(), hostname),
    };

    Ok((site_root, hostname))
}

/// Keeps the first occurrence of each URL, preserving order otherwise.
fn dedup_by_url(feeds: Vec<FeedCandidate>) -> Vec<FeedCandidate> {
    let mut seen = HashSet::new();
    feeds
        .into_iter()
        .filter(|feed| seen.insert(feed.url.clone()))
        .collect()
}

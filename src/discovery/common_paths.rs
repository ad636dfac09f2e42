//! Concurrent probing of conventional feed paths.
//!
//! Every path in the fixed list is probed with a HEAD request in parallel.
//! Each probe carries its own timeout and swallows its own failures, so one
//! slow or broken path never delays or poisons its siblings. Results come
//! back in path-list order, not completion order — discovery output must be
//! reproducible across runs.

use super::{FeedCandidate, FeedSource};
use crate::fetch::Fetcher;
use futures::future::join_all;
use std::time::Duration;

/// Conventional feed locations, tried in this order.
pub(crate) const COMMON_FEED_PATHS: &[&str] = &[
    "/feed",                // WordPress and friends
    "/rss",                 // common shorthand
    "/feed/rss",            // WordPress explicit
    "/rss/index.xml",       // The Verge style
    "/atom",                // bare Atom
    "/rss.xml",             // generic RSS
    "/feed.xml",            // generic feed
    "/feeds/posts/default", // Blogger
    "/rssfeeds/",           // some news sites
    "/index.xml",           // Hugo and static generators
    "/feed/atom",           // Atom alternative
    "/atom.xml",            // Atom alternative
];

/// Content-type fragments that qualify a response as a feed.
const FEED_CONTENT_HINTS: &[&str] = &["xml", "rss", "atom", "feed"];

/// Probes all common paths concurrently and returns the hits in path-list
/// order.
pub(crate) async fn find_feeds(
    fetcher: &Fetcher,
    site_root: &str,
    hostname: &str,
    timeout: Duration,
) -> Vec<FeedCandidate> {
    let probes = COMMON_FEED_PATHS
        .iter()
        .map(|path| probe_path(fetcher, site_root, path, hostname, timeout));

    // join_all preserves input order, so no re-sort is needed afterwards.
    let feeds: Vec<FeedCandidate> = join_all(probes).await.into_iter().flatten().collect();
    tracing::debug!(site = %site_root, found = feeds.len(), "Common-path probing complete");
    feeds
}

/// Checks a single candidate path. `None` covers every shortfall: transport
/// error, timeout, non-2xx status, or a content type with no feed hint.
async fn probe_path(
    fetcher: &Fetcher,
    site_root: &str,
    path: &str,
    hostname: &str,
    timeout: Duration,
) -> Option<FeedCandidate> {
    let url = format!("{site_root}{path}");
    let head = match fetcher.head(&url, timeout).await {
        Ok(head) => head,
        Err(e) => {
            tracing::trace!(url = %url, error = %e, "Probe failed");
            return None;
        }
    };

    if !head.is_success() {
        return None;
    }

    let content_type = head.content_type.unwrap_or_default().to_lowercase();
    if !FEED_CONTENT_HINTS.iter().any(|hint| content_type.contains(hint)) {
        return None;
    }

    Some(FeedCandidate {
        url,
        source: FeedSource::CommonPath,
        title: format!("Feed di {hostname} ({path})"),
    })
}

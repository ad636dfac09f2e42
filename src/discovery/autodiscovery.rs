//! Feed autodiscovery from a site's home-page markup.
//!
//! Fetches the site root and scans every `<link>` element whose `rel` hints
//! at a feed and whose `type` names a feed MIME type. Transport errors and
//! non-2xx responses are not failures here — autodiscovery degrades to an
//! empty candidate list and the orchestrator moves on to the next strategy.

use super::{FeedCandidate, FeedSource};
use crate::fetch::Fetcher;
use crate::util::{attr_value, find_tags};
use std::time::Duration;

/// MIME identifiers that mark a `<link>` as a feed pointer.
const FEED_TYPE_IDENTIFIERS: &[&str] = &[
    "application/rss+xml",
    "application/atom+xml",
    "application/feed+json",
    "application/rss",
    "application/xml",
    "text/xml",
];

/// Scans the site's home page for feed `<link>` hints.
///
/// Returns candidates in document order; empty on any fetch or parse
/// shortfall.
pub(crate) async fn find_feeds(
    fetcher: &Fetcher,
    site_root: &str,
    hostname: &str,
    timeout: Duration,
) -> Vec<FeedCandidate> {
    let body = match fetcher.get(site_root, "text/html", timeout).await {
        Ok(body) if body.is_success() => body,
        Ok(body) => {
            tracing::debug!(site = %site_root, status = body.status, "Autodiscovery skipped: non-success status");
            return Vec::new();
        }
        Err(e) => {
            tracing::debug!(site = %site_root, error = %e, "Autodiscovery fetch failed");
            return Vec::new();
        }
    };

    let html = body.text_lossy();
    let feeds = extract_candidates(&html, site_root, hostname);
    tracing::debug!(site = %site_root, found = feeds.len(), "Autodiscovery scan complete");
    feeds
}

/// Pulls feed candidates out of HTML markup, in document order.
fn extract_candidates(html: &str, site_root: &str, hostname: &str) -> Vec<FeedCandidate> {
    find_tags(html, "link")
        .into_iter()
        .filter(|tag| is_feed_link(tag))
        .filter_map(|tag| {
            let href = attr_value(tag, "href")?;
            if href.is_empty() {
                return None;
            }
            let title = attr_value(tag, "title")
                .map(|t| t.to_owned())
                .unwrap_or_else(|| format!("Feed di {hostname}"));
            Some(FeedCandidate {
                url: resolve_href(href, site_root),
                source: FeedSource::Autodiscovery,
                title,
            })
        })
        .collect()
}

/// A `<link>` counts as a feed pointer when `rel` contains `alternate` or
/// `feed` (case-insensitive) and `type` names one of the feed MIME types.
fn is_feed_link(tag: &str) -> bool {
    let rel = attr_value(tag, "rel").unwrap_or("").to_lowercase();
    if !rel.contains("alternate") && !rel.contains("feed") {
        return false;
    }

    let link_type = attr_value(tag, "type").unwrap_or("");
    FEED_TYPE_IDENTIFIERS
        .iter()
        .any(|ident| link_type.contains(ident))
}

/// Resolves an `href` against the site root.
///
/// Absolute URLs pass through, root-relative paths are prefixed with the
/// site root, and anything else is joined with a `/` separator. This is the
/// documented join rule, not RFC 3986 resolution.
fn resolve_href(href: &str, site_root: &str) -> String {
    if href.starts_with("http") {
        href.to_owned()
    } else if href.starts_with('/') {
        format!("{site_root}{href}")
    } else {
        format!("{site_root}/{href}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SITE: &str = "https://example.com";
    const HOST: &str = "example.com";

    #[test]
    fn test_extract_rss_and_atom_links_in_document_order() {
        let html = r#"<html><head>
            <link rel="alternate" type="application/rss+xml" href="/feed.xml" title="Main RSS">
            <link rel="stylesheet" href="/style.css">
            <link rel="alternate" type="application/atom+xml" href="https://example.com/atom.xml" title="Atom">
        </head><body></body></html>"#;

        let feeds = extract_candidates(html, SITE, HOST);
        assert_eq!(feeds.len(), 2);
        assert_eq!(feeds[0].url, "https://example.com/feed.xml");
        assert_eq!(feeds[0].title, "Main RSS");
        assert_eq!(feeds[0].source, FeedSource::Autodiscovery);
        assert_eq!(feeds[1].url, "https://example.com/atom.xml");
        assert_eq!(feeds[1].title, "Atom");
    }

    #[test]
    fn test_rel_feed_variant_matches() {
        let html = r#"<link rel="feed" type="application/rss+xml" href="/rss">"#;
        let feeds = extract_candidates(html, SITE, HOST);
        assert_eq!(feeds.len(), 1);
        assert_eq!(feeds[0].url, "https://example.com/rss");
    }

    #[test]
    fn test_rel_match_is_case_insensitive_substring() {
        let html = r#"<link rel="ALTERNATE stylesheet" type="application/rss+xml" href="/rss">"#;
        let feeds = extract_candidates(html, SITE, HOST);
        assert_eq!(feeds.len(), 1);
    }

    #[test]
    fn test_type_must_name_a_feed_mime() {
        let html = r#"<link rel="alternate" type="text/html" href="/page">"#;
        assert!(extract_candidates(html, SITE, HOST).is_empty());
    }

    #[test]
    fn test_generic_xml_types_accepted() {
        let html = r#"<head>
            <link rel="alternate" type="application/xml" href="/a">
            <link rel="alternate" type="text/xml" href="/b">
            <link rel="alternate" type="application/feed+json" href="/c">
        </head>"#;
        let feeds = extract_candidates(html, SITE, HOST);
        assert_eq!(feeds.len(), 3);
    }

    #[test]
    fn test_missing_href_is_skipped() {
        let html = r#"<link rel="alternate" type="application/rss+xml" title="No href">"#;
        assert!(extract_candidates(html, SITE, HOST).is_empty());
    }

    #[test]
    fn test_title_falls_back_to_hostname() {
        let html = r#"<link rel="alternate" type="application/rss+xml" href="/feed">"#;
        let feeds = extract_candidates(html, SITE, HOST);
        assert_eq!(feeds[0].title, "Feed di example.com");
    }

    #[test]
    fn test_resolve_absolute_href_passes_through() {
        assert_eq!(
            resolve_href("https://feeds.example.org/rss", SITE),
            "https://feeds.example.org/rss"
        );
    }

    #[test]
    fn test_resolve_root_relative_href() {
        assert_eq!(resolve_href("/feed.xml", SITE), "https://example.com/feed.xml");
    }

    #[test]
    fn test_resolve_bare_relative_href() {
        assert_eq!(resolve_href("feed.xml", SITE), "https://example.com/feed.xml");
    }

    #[tokio::test]
    async fn test_non_success_status_yields_empty() {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let fetcher = Fetcher::new();
        let feeds = find_feeds(
            &fetcher,
            &mock_server.uri(),
            "127.0.0.1",
            Duration::from_secs(5),
        )
        .await;
        assert!(feeds.is_empty());
    }

    #[tokio::test]
    async fn test_network_error_yields_empty() {
        let fetcher = Fetcher::new();
        // Port 1 is closed; connection refused must degrade to empty.
        let feeds = find_feeds(
            &fetcher,
            "http://127.0.0.1:1",
            "127.0.0.1",
            Duration::from_secs(1),
        )
        .await;
        assert!(feeds.is_empty());
    }

    #[tokio::test]
    async fn test_full_scan_over_http() {
        use wiremock::matchers::{header, method};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let html = r#"<html><head>
            <link rel="alternate" type="application/rss+xml" href="/feed.xml" title="Site Feed">
        </head></html>"#;

        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("Accept", "text/html"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(html)
                    .insert_header("Content-Type", "text/html"),
            )
            .mount(&mock_server)
            .await;

        let fetcher = Fetcher::new();
        let site = mock_server.uri();
        let feeds = find_feeds(&fetcher, &site, "127.0.0.1", Duration::from_secs(5)).await;

        assert_eq!(feeds.len(), 1);
        assert_eq!(feeds[0].url, format!("{site}/feed.xml"));
        assert_eq!(feeds[0].title, "Site Feed");
    }
}

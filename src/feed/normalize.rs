//! Normalization of RSS/Atom documents into the canonical article schema.
//!
//! Heterogeneous source feeds disagree about nearly everything: where the
//! body text lives, how entries are identified, which of several places an
//! image hides in. Normalization resolves each field through a fixed
//! precedence chain so callers see one shape regardless of the source
//! format. Input bytes are decoded as UTF-8 with lossy replacement first —
//! a feed with a broken encoding still normalizes.

use crate::util::{first_img_src, Clock};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;
use url::Url;

/// Wire format of `pubDate` values.
const PUBDATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Errors produced while turning feed bytes into a [`FeedResponse`].
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// The document parsed but contains no entries. Distinct from a
    /// transport or parse failure: the feed exists, it is just empty.
    #[error("no articles found in feed")]
    NoArticles,
    /// The bytes could not be parsed as RSS or Atom.
    #[error("failed to parse feed: {0}")]
    Parse(String),
}

/// Source feed format, as exposed to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedType {
    Rss,
    Atom,
}

/// One article in canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    pub id: String,
    pub title: String,
    pub link: String,
    pub content: String,
    pub description: String,
    pub image_url: String,
    pub pub_date: String,
    pub categories: Vec<String>,
    pub author: String,
    pub source_name: String,
}

/// A normalized feed: metadata plus items in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedResponse {
    pub feed_type: FeedType,
    pub title: String,
    pub description: String,
    pub link: String,
    pub items: Vec<FeedItem>,
}

/// Parses raw feed bytes and normalizes every entry.
///
/// The parser is built with a neutral ID generator: feed-rs would otherwise
/// synthesize hashed IDs for entries that carry none, which hides whether
/// the source actually had one. Here an absent ID stays empty so the
/// documented fallback chain (`id` → `link + "_" + epoch`) applies.
pub fn normalize(
    bytes: &[u8],
    feed_url: &str,
    clock: &dyn Clock,
) -> Result<FeedResponse, NormalizeError> {
    let text = String::from_utf8_lossy(bytes);

    let parser = feed_rs::parser::Builder::new()
        .id_generator(|_links, _title, _uri| String::new())
        .build();
    let feed = parser
        .parse(text.as_bytes())
        .map_err(|e| NormalizeError::Parse(e.to_string()))?;

    if feed.entries.is_empty() {
        return Err(NormalizeError::NoArticles);
    }

    let feed_type = match feed.feed_type {
        feed_rs::model::FeedType::Atom => FeedType::Atom,
        _ => FeedType::Rss,
    };

    let title = feed
        .title
        .map(|t| t.content)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| host_of(feed_url));
    let description = feed.description.map(|d| d.content).unwrap_or_default();

    let items = feed
        .entries
        .into_iter()
        .map(|entry| normalize_entry(entry, &title, clock))
        .collect();

    Ok(FeedResponse {
        feed_type,
        title,
        description,
        link: feed_url.to_owned(),
        items,
    })
}

fn normalize_entry(entry: feed_rs::model::Entry, feed_title: &str, clock: &dyn Clock) -> FeedItem {
    let link = entry
        .links
        .first()
        .map(|l| l.href.clone())
        .unwrap_or_default();

    let title = entry
        .title
        .as_ref()
        .map(|t| t.content.clone())
        .unwrap_or_else(|| "No title".to_owned());

    // Atom `content` first (feed-rs keeps the first value when the source
    // is multi-valued), RSS `description` (mapped to summary) second.
    let content = entry
        .content
        .as_ref()
        .and_then(|c| c.body.clone())
        .or_else(|| entry.summary.as_ref().map(|s| s.content.clone()))
        .unwrap_or_default();

    let description = entry
        .summary
        .as_ref()
        .map(|s| s.content.clone())
        .unwrap_or_else(|| content.clone());

    let pub_date = format_pub_date(entry.published.or(entry.updated), clock);

    let id = if entry.id.is_empty() {
        format!("{}_{}", link, clock.now().timestamp())
    } else {
        entry.id.clone()
    };

    let categories: Vec<String> = entry
        .categories
        .iter()
        .map(|c| {
            if !c.term.is_empty() {
                c.term.clone()
            } else {
                c.label.clone().unwrap_or_default()
            }
        })
        .filter(|c| !c.is_empty())
        .collect();

    let author = entry
        .authors
        .first()
        .map(|p| p.name.clone())
        .unwrap_or_default();

    let image_url = find_image_url(&entry, &content);

    FeedItem {
        id,
        title,
        link,
        content,
        description,
        image_url,
        pub_date,
        categories,
        author,
        source_name: feed_title.to_owned(),
    }
}

fn format_pub_date(parsed: Option<DateTime<Utc>>, clock: &dyn Clock) -> String {
    parsed
        .unwrap_or_else(|| clock.now())
        .format(PUBDATE_FORMAT)
        .to_string()
}

/// Best-effort image extraction. Search order, first hit wins:
///
/// 1. an enclosure or media content whose type names an image
/// 2. any `media:content` URL
/// 3. a `media:thumbnail` URL
/// 4. the first `<img src>` in the entry's content HTML, with
///    protocol-relative URLs upgraded to https
/// 5. a regex scan of the content for an absolute image URL
fn find_image_url(entry: &feed_rs::model::Entry, content: &str) -> String {
    for link in &entry.links {
        let is_enclosure = link.rel.as_deref() == Some("enclosure");
        let is_image = link
            .media_type
            .as_deref()
            .is_some_and(|t| t.contains("image"));
        if is_enclosure && is_image {
            return link.href.clone();
        }
    }

    for media in &entry.media {
        for mc in &media.content {
            let is_image = mc
                .content_type
                .as_ref()
                .is_some_and(|t| t.to_string().contains("image"));
            if is_image {
                if let Some(url) = &mc.url {
                    return url.as_str().to_owned();
                }
            }
        }
    }

    for media in &entry.media {
        for mc in &media.content {
            if let Some(url) = &mc.url {
                return url.as_str().to_owned();
            }
        }
    }

    for media in &entry.media {
        if let Some(thumb) = media.thumbnails.first() {
            return thumb.image.uri.clone();
        }
    }

    if let Some(src) = first_img_src(content) {
        if let Some(rest) = src.strip_prefix("//") {
            return format!("https://{rest}");
        }
        return src.to_owned();
    }

    img_src_regex()
        .captures(content)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_owned())
        .unwrap_or_default()
}

fn img_src_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"<img[^>]+src=["'](https?://[^"']+)["']"#).expect("static image regex")
    })
}

fn host_of(feed_url: &str) -> String {
    Url::parse(feed_url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_owned))
        .unwrap_or_default()
}

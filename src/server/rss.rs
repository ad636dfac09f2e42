//! `GET /rss` — fetch and normalize a feed.

use super::error::ApiError;
use super::AppState;
use crate::feed::FeedResponse;
use axum::extract::{Query, State};
use axum::response::Json;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct RssQuery {
    url: Option<String>,
    #[serde(default)]
    debug: bool,
    #[serde(default, rename = "bypassCache")]
    bypass_cache: bool,
}

/// Returns the normalized form of the feed at `url`.
///
/// A feed with zero entries is `404`; upstream fetch failures carry the
/// upstream status through verbatim.
pub async fn handle(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RssQuery>,
) -> Result<Json<FeedResponse>, ApiError> {
    let url = query
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or(ApiError::MissingParam("url"))?;

    let feed = state
        .feeds
        .fetch_feed(&url, query.debug, query.bypass_cache)
        .await?;
    Ok(Json(feed))
}

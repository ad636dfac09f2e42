//! `GET /discover` — find feeds for a website.

use super::error::ApiError;
use super::AppState;
use crate::discovery::DiscoveryResult;
use axum::extract::{Query, State};
use axum::response::Json;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct DiscoverQuery {
    url: Option<String>,
}

/// Returns the discovered feeds for the site named by `url`.
///
/// Zero feeds found is a success (`200` with an empty list); only a missing
/// or unparseable `url` is a client error.
pub async fn handle(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DiscoverQuery>,
) -> Result<Json<DiscoveryResult>, ApiError> {
    let url = query
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or(ApiError::MissingParam("url"))?;

    let result = state.discovery.discover(&url).await?;
    Ok(Json(result))
}

//! HTTP error mapping for the API surface.

use crate::discovery::DiscoverError;
use crate::feed::FeedError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use thiserror::Error;

/// Errors a handler can return, each with a fixed status mapping.
///
/// Upstream HTTP failures from the direct feed/image fetch propagate their
/// status verbatim; everything unexpected collapses to 500. "Zero feeds
/// discovered" is not here at all — that is a 200 with an empty list.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A required query parameter is absent.
    #[error("missing required query parameter: {0}")]
    MissingParam(&'static str),
    /// The request is malformed (e.g. an unparseable site URL).
    #[error("{0}")]
    BadRequest(String),
    /// The feed parsed but has zero entries.
    #[error("no articles found in feed")]
    FeedEmpty,
    /// Upstream answered with this non-2xx status.
    #[error("upstream returned status {0}")]
    Upstream(u16),
    /// Upstream did not answer within the time budget.
    #[error("upstream request timed out")]
    UpstreamTimeout,
    /// Anything else.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingParam(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::FeedEmpty => StatusCode::NOT_FOUND,
            ApiError::Upstream(code) => {
                StatusCode::from_u16(*code).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            ApiError::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(status = %status, error = %self, "Request failed");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<DiscoverError> for ApiError {
    fn from(e: DiscoverError) -> Self {
        match e {
            DiscoverError::InvalidUrl(msg) => ApiError::BadRequest(format!("invalid URL: {msg}")),
        }
    }
}

impl From<FeedError> for ApiError {
    fn from(e: FeedError) -> Self {
        match e {
            FeedError::UpstreamStatus(status) => ApiError::Upstream(status),
            FeedError::UpstreamTimeout => ApiError::UpstreamTimeout,
            FeedError::NoArticles => ApiError::FeedEmpty,
            FeedError::Fetch(msg) | FeedError::Parse(msg) => ApiError::Internal(msg),
        }
    }
}

//! Timeboxed HTTP fetching with per-domain header policy.
//!
//! All outbound I/O in the service goes through [`Fetcher`]. Requests follow
//! redirects, carry a desktop browser User-Agent, and are bounded both in
//! time (caller-supplied timeout) and response size. A non-2xx status is not
//! an error at this layer — callers inspect [`FetchedBody::status`] and
//! decide; only transport failures, timeouts, and oversized bodies surface
//! as [`FetchError`].

use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Browser-like User-Agent; several news sites reject obvious bot agents.
pub const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Default Accept header for feed retrieval.
pub const FEED_ACCEPT: &str =
    "application/xml, application/rss+xml, application/atom+xml, text/html, */*";

/// Accept header for common-path probes.
pub const PROBE_ACCEPT: &str = "application/xml, application/rss+xml, application/atom+xml";

const MAX_BODY_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Errors that can occur while performing an HTTP request.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// Request exceeded its time budget
    #[error("Request timed out")]
    Timeout,
    /// Response body exceeded the size limit
    #[error("Response too large")]
    ResponseTooLarge,
}

/// Response to a GET: status, selected headers, and the full body.
#[derive(Debug)]
pub struct FetchedBody {
    pub status: u16,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl FetchedBody {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decodes the body as UTF-8, replacing invalid sequences. Never fails.
    pub fn text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// Response to a HEAD: status and content type only.
#[derive(Debug)]
pub struct HeadResponse {
    pub status: u16,
    pub content_type: Option<String>,
}

impl HeadResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Static header recipes for hosts known to block anonymous fetches.
///
/// The domain lists are configuration, not algorithm: a host whose name
/// contains one of the `referer_domains` entries gets a same-site
/// `Referer`/`Origin` pair, and `wired.it` additionally gets the cookie and
/// `Sec-Fetch-*` recipe its CDN expects.
#[derive(Debug, Clone)]
pub struct HeaderPolicy {
    referer_domains: &'static [&'static str],
}

/// Hosts that reject requests without a same-site Referer/Origin.
const REFERER_DOMAINS: &[&str] = &[
    "media-assets.wired.it",
    "repubblica.it",
    "corriere.it",
    "gazzetta.it",
    "lastampa.it",
    "ilsole24ore.com",
    "wired.it",
    "ansa.it",
    "nytimes.com",
];

impl Default for HeaderPolicy {
    fn default() -> Self {
        Self {
            referer_domains: REFERER_DOMAINS,
        }
    }
}

impl HeaderPolicy {
    /// Accept header for feed retrieval, with host-specific overrides.
    pub fn feed_accept(&self, host: &str) -> &'static str {
        if host.contains("wired.it") {
            "application/rss+xml, application/xml, */*"
        } else if host.contains("theinformation.com") {
            "application/atom+xml, application/xml, */*"
        } else {
            FEED_ACCEPT
        }
    }

    /// Extra headers for the given URL's host, per the static recipes.
    fn domain_headers(&self, url: &Url) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let host = match url.host_str() {
            Some(h) => h,
            None => return headers,
        };

        if self.referer_domains.iter().any(|d| host.contains(d)) {
            let origin = format!("https://{host}");
            if let Ok(value) = HeaderValue::from_str(&format!("{origin}/")) {
                headers.insert(reqwest::header::REFERER, value);
            }
            if let Ok(value) = HeaderValue::from_str(&origin) {
                headers.insert(reqwest::header::ORIGIN, value);
            }
        }

        if host.contains("wired.it") {
            headers.insert(reqwest::header::COOKIE, HeaderValue::from_static(""));
            headers.insert("Sec-Fetch-Dest", HeaderValue::from_static("image"));
            headers.insert("Sec-Fetch-Mode", HeaderValue::from_static("no-cors"));
        }

        headers
    }
}

/// HTTP client wrapper: the service's sole I/O boundary.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    policy: HeaderPolicy,
}

impl Fetcher {
    pub fn new() -> Self {
        Self::with_policy(HeaderPolicy::default())
    }

    pub fn with_policy(policy: HeaderPolicy) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();
        Self { client, policy }
    }

    pub fn policy(&self) -> &HeaderPolicy {
        &self.policy
    }

    /// Issues a GET with the given Accept header and time budget, following
    /// redirects. Returns the response whatever its status; errs only on
    /// transport failure, timeout, or an oversized body.
    pub async fn get(
        &self,
        url: &str,
        accept: &str,
        timeout: Duration,
    ) -> Result<FetchedBody, FetchError> {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(accept) {
            headers.insert(reqwest::header::ACCEPT, value);
        }
        headers.insert(
            reqwest::header::CACHE_CONTROL,
            HeaderValue::from_static("no-cache"),
        );
        if let Ok(parsed) = Url::parse(url) {
            headers.extend(self.policy.domain_headers(&parsed));
        }

        let request = self.client.get(url).headers(headers);

        // Single budget covers connect, headers, and body read.
        tokio::time::timeout(timeout, async move {
            let response = request.send().await.map_err(FetchError::Network)?;
            let status = response.status().as_u16();
            let content_type = header_str(response.headers(), reqwest::header::CONTENT_TYPE);
            let bytes = read_limited_bytes(response, MAX_BODY_SIZE).await?;
            Ok(FetchedBody {
                status,
                content_type,
                bytes,
            })
        })
        .await
        .map_err(|_| FetchError::Timeout)?
    }

    /// Issues a HEAD request with its own time budget.
    pub async fn head(&self, url: &str, timeout: Duration) -> Result<HeadResponse, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            HeaderValue::from_static(PROBE_ACCEPT),
        );

        let request = self.client.head(url).headers(headers);
        let response = tokio::time::timeout(timeout, request.send())
            .await
            .map_err(|_| FetchError::Timeout)?
            .map_err(FetchError::Network)?;

        Ok(HeadResponse {
            status: response.status().as_u16(),
            content_type: header_str(response.headers(), reqwest::header::CONTENT_TYPE),
        })
    }
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new()
    }
}

fn header_str(headers: &HeaderMap, name: reqwest::header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_owned())
}

/// Reads a response body with a size limit using stream-based reading.
async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FetchError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}

//! Fixed response headers
//!
//! Clients written against the canonical API read rate-limit headers on
//! every response. The gateway does not meter requests, so the values are
//! constant.

use http::HeaderMap;
use http::header::{CONNECTION, CONTENT_TYPE, HeaderName, HeaderValue};

const RATE_LIMIT_HEADERS: [(&str, &str); 4] = [
    ("anthropic-ratelimit-requests-remaining", "1000"),
    ("anthropic-ratelimit-requests-reset", "60"),
    ("anthropic-ratelimit-tokens-remaining", "100000"),
    ("anthropic-ratelimit-tokens-reset", "60"),
];

fn rate_limit_headers() -> HeaderMap {
    RATE_LIMIT_HEADERS
        .into_iter()
        .map(|(name, value)| (HeaderName::from_static(name), HeaderValue::from_static(value)))
        .collect()
}

/// Headers for a complete JSON response
pub fn json_headers() -> HeaderMap {
    let mut headers = rate_limit_headers();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers
}

/// Headers added to an event-stream response
///
/// `Sse` sets the content type and `Cache-Control` itself.
pub fn stream_headers() -> HeaderMap {
    let mut headers = rate_limit_headers();
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    headers
}

//! Response content classification.

use axum::http::{header, HeaderMap};

/// How an upstream response body should be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContentClass {
    /// Body is an HTML document and goes through the rewrite path.
    pub is_html: bool,
    /// Body is gzip-encoded.
    pub is_compressed: bool,
}

impl ContentClass {
    /// Classify a response from its headers alone.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let content_type = header_lowercase(headers, header::CONTENT_TYPE);
        let content_encoding = header_lowercase(headers, header::CONTENT_ENCODING);

        Self {
            is_html: content_type
                .as_deref()
                .is_some_and(|ct| ct.contains("text/html") || ct.contains("application/xhtml+xml")),
            is_compressed: content_encoding
                .as_deref()
                .is_some_and(|ce| ce.contains("gzip")),
        }
    }
}

fn header_lowercase(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_ascii_lowercase)
}

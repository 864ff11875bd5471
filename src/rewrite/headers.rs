//! Response header rewriting.
//!
//! # Responsibilities
//! - Replace the origin URL with the local server URL in every header value
//! - Strip the `Secure;` attribute from `Set-Cookie` values
//!
//! # Design Decisions
//! - Plain substring substitution; values are never parsed and rebuilt
//! - Multi-valued headers are rewritten value by value, order preserved
//! - A value that is not valid UTF-8, or that cannot be re-encoded, is kept as is

use axum::http::{header, HeaderMap, HeaderValue};

const SECURE_ATTRIBUTE: &str = "Secure;";

/// Rewrites absolute origin URLs in response headers.
#[derive(Debug, Clone)]
pub struct HeaderRewriter {
    origin_url: String,
    local_url: String,
}

impl HeaderRewriter {
    /// `origin_url` is replaced by `local_url` (`http://{host}:{port}`).
    pub fn new(origin_url: impl Into<String>, local_url: impl Into<String>) -> Self {
        Self {
            origin_url: origin_url.into(),
            local_url: local_url.into(),
        }
    }

    /// Produce the client-facing header set.
    pub fn rewrite(&self, headers: &HeaderMap) -> HeaderMap {
        let mut rewritten = HeaderMap::with_capacity(headers.len());
        for (name, value) in headers {
            let value = if name == header::SET_COOKIE {
                self.rewrite_value(&strip_secure(value))
            } else {
                self.rewrite_value(value)
            };
            rewritten.append(name.clone(), value);
        }
        rewritten
    }

    fn rewrite_value(&self, value: &HeaderValue) -> HeaderValue {
        let Ok(text) = value.to_str() else {
            return value.clone();
        };
        if !text.contains(&self.origin_url) {
            return value.clone();
        }
        let replaced = text.replace(&self.origin_url, &self.local_url);
        match HeaderValue::from_str(&replaced) {
            Ok(new_value) => new_value,
            Err(e) => {
                tracing::error!(error = %e, value = %replaced, "Rewritten header value is invalid, keeping original");
                value.clone()
            }
        }
    }
}

/// Remove every `Secure;` token from a cookie string.
pub fn strip_secure(value: &HeaderValue) -> HeaderValue {
    match value.to_str() {
        Ok(cookie) if cookie.contains(SECURE_ATTRIBUTE) => {
            HeaderValue::from_str(&cookie.replace(SECURE_ATTRIBUTE, "")).unwrap_or_else(|_| value.clone())
        }
        _ => value.clone(),
    }
}

//! Request preparation for forwarding.
//!
//! # Responsibilities
//! - Point the request URI at the chosen upstream
//! - Rewrite `Host` to the upstream authority
//! - Strip hop-by-hop headers
//!
//! # Design Decisions
//! - Method, path, query and body are forwarded unchanged
//! - Upstreams are plain HTTP

use std::str::FromStr;

use axum::body::Body;
use axum::http::uri::{Authority, PathAndQuery, Scheme};
use axum::http::{header, HeaderValue, Request, Uri};
use thiserror::Error;
use url::Url;

use crate::config::ConfigError;
use crate::http::response::strip_hop_by_hop;

/// Errors raised while forwarding a request.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("invalid upstream URI: {0}")]
    Uri(#[from] axum::http::Error),

    #[error("{}", describe(.0))]
    Upstream(#[from] hyper_util::client::legacy::Error),
}

/// Flatten an error and its sources into one line.
fn describe(error: &(dyn std::error::Error + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// A plain-HTTP upstream server.
#[derive(Debug, Clone)]
pub struct UpstreamTarget {
    authority: Authority,
}

impl UpstreamTarget {
    /// Parse an absolute `http://host[:port]` URL.
    pub fn parse(url: &str) -> Result<Self, ConfigError> {
        let upstream_error = |reason: String| ConfigError::Upstream {
            url: url.to_string(),
            reason,
        };
        let parsed = Url::parse(url).map_err(|e| upstream_error(e.to_string()))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| upstream_error("missing host".to_string()))?;
        let authority = match parsed.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        let authority =
            Authority::from_str(&authority).map_err(|e| upstream_error(e.to_string()))?;
        Ok(Self { authority })
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    /// Rewrite `request` so it targets this upstream.
    pub fn prepare(&self, request: Request<Body>) -> Result<Request<Body>, ForwardError> {
        let (mut parts, body) = request.into_parts();

        let path_and_query = parts
            .uri
            .path_and_query()
            .cloned()
            .unwrap_or_else(|| PathAndQuery::from_static("/"));
        parts.uri = Uri::builder()
            .scheme(Scheme::HTTP)
            .authority(self.authority.clone())
            .path_and_query(path_and_query)
            .build()?;

        strip_hop_by_hop(&mut parts.headers);
        if let Ok(host) = HeaderValue::from_str(self.authority.as_str()) {
            parts.headers.insert(header::HOST, host);
        }

        Ok(Request::from_parts(parts, body))
    }
}

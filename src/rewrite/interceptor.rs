//! Per-response interception pipeline.
//!
//! # Data Flow
//! ```text
//! upstream response
//!     → classify.rs (HTML? gzip?)
//!     → non-HTML: headers rewritten, body streamed through untouched
//!     → HTML: decoder.rs (buffer to end-of-stream, gunzip)
//!           → empty body: forwarded as is
//!           → tags.rs + markup.rs (replace clientlibs)
//!           → modified: new body, content headers reset
//!           → unchanged: original bytes, original encoding
//! connection failure
//!     → failure.rs (500, text/plain)
//! ```

use std::fmt::Display;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, Response};

use crate::config::{ConfigError, DevContext, PluginOptions};
use crate::observability::metrics;
use crate::rewrite::classify::ContentClass;
use crate::rewrite::decoder::{collect_body, decode_text, DecodeError};
use crate::rewrite::failure::failure_response;
use crate::rewrite::headers::HeaderRewriter;
use crate::rewrite::markup::dev_markup;
use crate::rewrite::pattern::ClientlibPattern;
use crate::rewrite::tags::rewrite_clientlibs;

/// Rewrites origin responses for one proxy configuration.
///
/// Built once at startup and shared by every request. The development markup
/// is rendered here, not per response.
#[derive(Debug)]
pub struct ResponseInterceptor {
    pattern: ClientlibPattern,
    headers: HeaderRewriter,
    markup: String,
}

impl ResponseInterceptor {
    /// Compile the clientlib pattern for `options`.
    pub fn new(options: &PluginOptions, context: Arc<DevContext>) -> Result<Self, ConfigError> {
        let pattern = ClientlibPattern::compile(options)?;
        let headers = HeaderRewriter::new(options.aem_url(), context.build.server.url());
        tracing::debug!(pattern = %pattern.as_str(), "Clientlib pattern compiled");
        Ok(Self {
            pattern,
            headers,
            markup: dev_markup(&context),
        })
    }

    /// Full pipeline for responses from the content route.
    pub async fn intercept(
        &self,
        request_path: &str,
        upstream: Response<Body>,
    ) -> Result<Response<Body>, DecodeError> {
        let (mut parts, body) = upstream.into_parts();
        let class = ContentClass::from_headers(&parts.headers);
        let mut headers = self.headers.rewrite(&parts.headers);

        if !class.is_html {
            metrics::record_response("passthrough");
            parts.headers = headers;
            return Ok(Response::from_parts(parts, body));
        }

        let raw = collect_body(body).await?;
        if raw.is_empty() {
            metrics::record_response("unchanged");
            tracing::debug!(path = %request_path, "Empty body, proxied without changes");
            parts.headers = headers;
            return Ok(Response::from_parts(parts, Body::empty()));
        }

        let html = decode_text(&raw, class.is_compressed)?;

        tracing::debug!(
            path = %request_path,
            content_length = html.len(),
            compressed = class.is_compressed,
            "Parsing response"
        );

        let rewrite = rewrite_clientlibs(&html, &self.pattern, || self.markup.clone());
        metrics::record_clientlib_matches(rewrite.matches);

        tracing::debug!(
            path = %request_path,
            matches = rewrite.matches,
            modified = rewrite.modified(),
            "Clientlib scan complete"
        );

        let body = if rewrite.modified() {
            mark_rewritten(&mut headers);
            metrics::record_response("rewritten");
            tracing::info!(path = %request_path, "Proxied with development entries");
            Body::from(rewrite.html)
        } else {
            metrics::record_response("unchanged");
            tracing::debug!(path = %request_path, "Proxied without changes");
            Body::from(raw)
        };

        parts.headers = headers;
        Ok(Response::from_parts(parts, body))
    }

    /// Rewrite headers only; the body is streamed through.
    pub fn passthrough(&self, upstream: Response<Body>) -> Response<Body> {
        let (mut parts, body) = upstream.into_parts();
        parts.headers = self.headers.rewrite(&parts.headers);
        metrics::record_response("passthrough");
        Response::from_parts(parts, body)
    }

    /// Response for a failed upstream connection.
    pub fn on_error(&self, request_path: &str, error: &dyn Display) -> Response<Body> {
        tracing::error!(path = %request_path, error = %error, "Upstream connection failed");
        metrics::record_upstream_error("origin");
        failure_response(error)
    }
}

fn mark_rewritten(headers: &mut HeaderMap) {
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/html"));
    headers.remove(header::CONTENT_ENCODING);
    headers.remove(header::CONTENT_LENGTH);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BundleEntries, LocalServer, ResolvedBuildConfig};
    use axum::http::StatusCode;
    use bytes::Bytes;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::collections::BTreeSet;
    use std::io::Write;

    const CLIENTLIB_SCRIPT: &str =
        r#"<script src="/etc.clientlibs/we-retail/clientlibs/clientlib-site.js"></script>"#;
    const CLIENTLIB_LINK: &str = r#"<link rel="stylesheet" href="/etc.clientlibs/we-retail/clientlibs/clientlib-site.css">"#;

    fn interceptor() -> ResponseInterceptor {
        let options = PluginOptions::new(
            vec!["we-retail".into()],
            "/etc.clientlibs/we-retail/clientlibs/clientlib-site",
        )
        .unwrap();
        let context = DevContext {
            bundle_entries: BundleEntries::new(vec!["src/main.ts".to_string()]),
            build: ResolvedBuildConfig {
                base: "/".into(),
                server: LocalServer {
                    host: "localhost".into(),
                    port: 3000,
                },
                active_plugins: BTreeSet::new(),
            },
        };
        ResponseInterceptor::new(&options, Arc::new(context)).unwrap()
    }

    fn page(head: &str) -> String {
        format!("<html><head>{head}</head><body></body></html>")
    }

    fn upstream(headers: &[(&'static str, &'static str)], body: impl Into<Body>) -> Response<Body> {
        let mut builder = Response::builder().status(StatusCode::OK);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(body.into()).unwrap()
    }

    async fn body_text(response: Response<Body>) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_status_forwarded() {
        let mut response = upstream(&[("content-type", "application/json")], "{}");
        *response.status_mut() = StatusCode::MOVED_PERMANENTLY;
        let out = interceptor().intercept("/content/we-retail/en.html", response).await.unwrap();
        assert_eq!(out.status(), StatusCode::MOVED_PERMANENTLY);
    }

    #[tokio::test]
    async fn test_non_html_untouched() {
        let response = upstream(
            &[("content-type", "application/json"), ("content-length", "11")],
            CLIENTLIB_SCRIPT.to_string(),
        );
        let out = interceptor().intercept("/bin/api.json", response).await.unwrap();
        assert_eq!(out.headers()[header::CONTENT_LENGTH], "11");
        assert_eq!(body_text(out).await, CLIENTLIB_SCRIPT);
    }

    #[tokio::test]
    async fn test_unmatched_html_byte_identical() {
        let html = page(r#"<script src="/@vite/client"></script>"#);
        let response = upstream(
            &[("content-type", "text/html; charset=utf-8"), ("content-length", "72")],
            html.clone(),
        );
        let out = interceptor().intercept("/content/we-retail/en.html", response).await.unwrap();
        assert_eq!(out.headers()[header::CONTENT_TYPE], "text/html; charset=utf-8");
        assert_eq!(out.headers()[header::CONTENT_LENGTH], "72");
        assert_eq!(body_text(out).await, html);
    }

    #[tokio::test]
    async fn test_script_replaced() {
        let response = upstream(
            &[("content-type", "text/html; charset=utf-8"), ("content-length", "999")],
            page(CLIENTLIB_SCRIPT),
        );
        let out = interceptor().intercept("/content/we-retail/en.html", response).await.unwrap();
        assert_eq!(out.headers()[header::CONTENT_TYPE], "text/html");
        assert!(out.headers().get(header::CONTENT_LENGTH).is_none());

        let body = body_text(out).await;
        assert!(body.contains("/@vite/client"));
        assert!(body.contains(r#"<script type="module" src="/src/main.ts"></script>"#));
        assert!(!body.contains(CLIENTLIB_SCRIPT));
    }

    #[tokio::test]
    async fn test_only_last_match_injected() {
        let response = upstream(
            &[("content-type", "text/html")],
            page(&format!("{CLIENTLIB_LINK}\n{CLIENTLIB_SCRIPT}")),
        );
        let out = interceptor().intercept("/content/we-retail/en.html", response).await.unwrap();
        let body = body_text(out).await;
        assert!(!body.contains(CLIENTLIB_LINK));
        assert!(!body.contains(CLIENTLIB_SCRIPT));
        assert_eq!(body.matches("/@vite/client").count(), 1);
    }

    #[tokio::test]
    async fn test_gzip_html_rewritten() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(page(CLIENTLIB_SCRIPT).as_bytes()).unwrap();
        let compressed = Bytes::from(encoder.finish().unwrap());

        let response = upstream(
            &[("content-type", "text/html"), ("content-encoding", "gzip")],
            compressed,
        );
        let out = interceptor().intercept("/content/we-retail/en.html", response).await.unwrap();
        assert!(out.headers().get(header::CONTENT_ENCODING).is_none());

        let body = body_text(out).await;
        assert!(body.contains("/@vite/client"));
        assert!(!body.contains(CLIENTLIB_SCRIPT));
    }

    #[tokio::test]
    async fn test_corrupt_gzip_fails_request() {
        let response = upstream(
            &[("content-type", "text/html"), ("content-encoding", "gzip")],
            "not gzip at all",
        );
        let result = interceptor().intercept("/content/we-retail/en.html", response).await;
        assert!(matches!(result, Err(DecodeError::Gzip(_))));
    }

    #[tokio::test]
    async fn test_empty_gzip_html_forwarded() {
        let mut response = upstream(
            &[("content-type", "text/html"), ("content-encoding", "gzip")],
            Body::empty(),
        );
        *response.status_mut() = StatusCode::NOT_MODIFIED;
        let out = interceptor().intercept("/content/we-retail/en.html", response).await.unwrap();
        assert_eq!(out.status(), StatusCode::NOT_MODIFIED);
        assert_eq!(out.headers()[header::CONTENT_ENCODING], "gzip");
        assert!(body_text(out).await.is_empty());
    }

    #[tokio::test]
    async fn test_markup_rendered_once() {
        let interceptor = interceptor();
        assert!(interceptor.markup.contains(r#"<script type="module" src="/src/main.ts"></script>"#));
        for _ in 0..2 {
            let response = upstream(&[("content-type", "text/html")], page(CLIENTLIB_SCRIPT));
            let out = interceptor.intercept("/content/we-retail/en.html", response).await.unwrap();
            assert!(body_text(out).await.contains(&interceptor.markup));
        }
    }

    #[tokio::test]
    async fn test_location_rewritten_on_all_paths() {
        let response = upstream(
            &[
                ("content-type", "application/json"),
                ("location", "http://localhost:4502/content/we-retail/en.html"),
            ],
            "",
        );
        let out = interceptor().passthrough(response);
        assert_eq!(
            out.headers()[header::LOCATION],
            "http://localhost:3000/content/we-retail/en.html"
        );
    }

    #[tokio::test]
    async fn test_on_error() {
        let out = interceptor().on_error("/content/we-retail/en.html", &"ECONNREFUSED");
        assert_eq!(out.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_text(out).await.contains("ECONNREFUSED"));
    }
}

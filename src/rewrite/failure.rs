//! Upstream connection failure responses.

use std::fmt::Display;

use axum::body::Body;
use axum::http::{header, HeaderValue, Response, StatusCode};

/// Prefix of every synthesized failure body.
pub const FAILURE_PREFIX: &str = "[aem-dev-proxy]";

/// Build the 500 response sent when the upstream connection fails.
///
/// The message is embedded verbatim so origin outages can be diagnosed from
/// the browser.
pub fn failure_response(error: &dyn Display) -> Response<Body> {
    let body = format!("{FAILURE_PREFIX} Something went wrong!\n\n{error}");
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    response
}

//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Compile the origin routes from plugin options
//! - Look up the route for a request path
//! - Fall back to the development asset server
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) ordered scan; first match wins
//! - Unrouted paths always reach the dev server, never a 404

use axum::http::Uri;
use serde::Serialize;

use crate::config::{ConfigError, PluginOptions};
use crate::routing::matcher::{Matcher, PathPatternMatcher};

/// Top-level origin path segments proxied without interception.
pub const AEM_PROXY_SEGMENTS: [&str; 15] = [
    "aem",
    "apps",
    "bin",
    "conf",
    "content",
    "crx",
    "etc",
    "etc.clientlibs",
    "home",
    "libs",
    "login",
    "mnt",
    "system",
    "var",
    r"(assets|editor|sites|screens)\.html",
];

const ROOT_PATTERN: &str = r"^/(index.html)?$";

/// Where a request is forwarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Upstream {
    Origin,
    DevServer,
}

/// What happens to the upstream response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteMode {
    /// Full pipeline: headers rewritten, HTML bodies rewritten.
    Intercept,
    /// Headers rewritten, body streamed.
    Passthrough,
    /// Forwarded untouched.
    Direct,
}

/// A compiled origin route.
#[derive(Debug)]
pub struct Route {
    pub name: &'static str,
    matcher: PathPatternMatcher,
    pub mode: RouteMode,
}

/// Outcome of a route lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteMatch {
    pub name: &'static str,
    pub upstream: Upstream,
    pub mode: RouteMode,
}

impl RouteMatch {
    const DEV_SERVER: Self = Self {
        name: "dev-server",
        upstream: Upstream::DevServer,
        mode: RouteMode::Direct,
    };
}

/// Route summary for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct RouteSummary {
    pub name: &'static str,
    pub pattern: String,
    pub upstream: Upstream,
    pub mode: RouteMode,
}

/// Ordered route table.
#[derive(Debug)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Build the content, segments and root routes.
    pub fn from_options(options: &PluginOptions) -> Result<Self, ConfigError> {
        let content = format!("^/content/({})/.*", options.content_paths.join("|"));

        let segments: Vec<&str> = options
            .aem_proxy_segments
            .iter()
            .flatten()
            .map(String::as_str)
            .chain(AEM_PROXY_SEGMENTS.iter().copied())
            .collect();
        let segments = format!("^/({})/.*", segments.join("|"));

        let routes = vec![
            Route {
                name: "content",
                matcher: PathPatternMatcher::new(&content)?,
                mode: RouteMode::Intercept,
            },
            Route {
                name: "segments",
                matcher: PathPatternMatcher::new(&segments)?,
                mode: RouteMode::Passthrough,
            },
            Route {
                name: "root",
                matcher: PathPatternMatcher::new(ROOT_PATTERN)?,
                mode: RouteMode::Passthrough,
            },
        ];

        Ok(Self { routes })
    }

    /// Find the route for a request.
    pub fn match_request(&self, uri: &Uri) -> RouteMatch {
        self.routes
            .iter()
            .find(|route| route.matcher.matches(uri))
            .map(|route| RouteMatch {
                name: route.name,
                upstream: Upstream::Origin,
                mode: route.mode,
            })
            .unwrap_or(RouteMatch::DEV_SERVER)
    }

    pub fn summary(&self) -> Vec<RouteSummary> {
        self.routes
            .iter()
            .map(|route| RouteSummary {
                name: route.name,
                pattern: route.matcher.as_str().to_string(),
                upstream: Upstream::Origin,
                mode: route.mode,
            })
            .collect()
    }
}

//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all proxy handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Bind server to listener
//! - Dispatch requests to the origin or the dev server
//! - Hand origin responses to the interceptor

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{Request, Response, StatusCode},
    response::IntoResponse,
    routing::any,
    Router,
};
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{ConfigError, DevContext, ProxyConfig};
use crate::http::request::{ForwardError, UpstreamTarget};
use crate::http::response::strip_hop_by_hop;
use crate::observability::metrics;
use crate::rewrite::{failure_response, DecodeError, ResponseInterceptor};
use crate::routing::{RouteMode, Router as ProxyRouter, Upstream};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<ProxyRouter>,
    pub interceptor: Arc<ResponseInterceptor>,
    pub origin: UpstreamTarget,
    pub dev_server: UpstreamTarget,
    pub client: Client<HttpConnector, Body>,
}

/// HTTP server for the development proxy.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server from a validated configuration and the frozen
    /// process context.
    pub fn new(config: &ProxyConfig, context: Arc<DevContext>) -> Result<Self, ConfigError> {
        let proxy_router = Arc::new(ProxyRouter::from_options(&config.plugin)?);
        let interceptor = Arc::new(ResponseInterceptor::new(&config.plugin, context)?);
        let origin = UpstreamTarget::parse(&config.plugin.aem_url())?;
        let dev_server = UpstreamTarget::parse(&config.dev_server.url)?;

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        let state = AppState {
            router: proxy_router,
            interceptor,
            origin,
            dev_server,
            client,
        };

        Ok(Self {
            router: Self::build_router(config, state),
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.timeouts.request_secs,
                    ))),
            )
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main proxy handler.
/// Looks up the route, forwards the request, and post-processes the response.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response<Body> {
    let path = request.uri().path().to_string();
    let route = state.router.match_request(request.uri());

    tracing::debug!(
        method = %request.method(),
        path = %path,
        route = route.name,
        "Proxying request"
    );

    let target = match route.upstream {
        Upstream::Origin => &state.origin,
        Upstream::DevServer => &state.dev_server,
    };

    let response = match forward(&state.client, target, request).await {
        Ok(response) => response,
        Err(e) => {
            return match route.upstream {
                Upstream::Origin => state.interceptor.on_error(&path, &e),
                Upstream::DevServer => {
                    tracing::error!(path = %path, error = %e, "Dev server connection failed");
                    metrics::record_upstream_error("dev_server");
                    failure_response(&e)
                }
            };
        }
    };

    match route.mode {
        RouteMode::Intercept => match state.interceptor.intercept(&path, response).await {
            Ok(response) => response,
            Err(e @ DecodeError::Stream(_)) => state.interceptor.on_error(&path, &e),
            Err(e @ DecodeError::Gzip(_)) => {
                tracing::error!(path = %path, error = %e, "Failed to decode origin response");
                (StatusCode::BAD_GATEWAY, e.to_string()).into_response()
            }
        },
        RouteMode::Passthrough => state.interceptor.passthrough(response),
        RouteMode::Direct => {
            metrics::record_response("direct");
            response
        }
    }
}

async fn forward(
    client: &Client<HttpConnector, Body>,
    target: &UpstreamTarget,
    request: Request<Body>,
) -> Result<Response<Body>, ForwardError> {
    let outgoing = target.prepare(request)?;
    let response: Response<Incoming> = client.request(outgoing).await?;
    let (mut parts, body) = response.into_parts();
    strip_hop_by_hop(&mut parts.headers);
    Ok(Response::from_parts(parts, Body::new(body)))
}

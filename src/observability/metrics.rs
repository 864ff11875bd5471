//! Metrics collection and exposition.
//!
//! # Metrics
//! - `aem_proxy_responses_total` (counter): responses by outcome
//!   (`rewritten`, `unchanged`, `passthrough`, `direct`)
//! - `aem_proxy_clientlib_matches_total` (counter): clientlib tags matched
//! - `aem_proxy_upstream_errors_total` (counter): failed upstream connections
//!
//! Recording is a no-op until a recorder is installed.

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics recorder"),
    }
}

pub fn record_response(outcome: &'static str) {
    counter!("aem_proxy_responses_total", "outcome" => outcome).increment(1);
}

pub fn record_clientlib_matches(matches: usize) {
    if matches > 0 {
        counter!("aem_proxy_clientlib_matches_total").increment(matches as u64);
    }
}

pub fn record_upstream_error(upstream: &'static str) {
    counter!("aem_proxy_upstream_errors_total", "upstream" => upstream).increment(1);
}

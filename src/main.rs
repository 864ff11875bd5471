//! AEM development proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────┐
//!                    │                  DEV PROXY                   │
//!                    │                                              │
//!   Browser Request  │  ┌─────────┐    ┌──────────┐                 │
//!   ─────────────────┼─▶│  http   │───▶│ routing  │──┬──────────────┼──▶ AEM origin
//!                    │  │ server  │    │  table   │  │              │
//!                    │  └─────────┘    └──────────┘  └──────────────┼──▶ dev server
//!                    │                                              │
//!   Browser Response │  ┌──────────────────────────┐                │
//!   ◀────────────────┼──│ rewrite (origin only)    │◀───────────────┼─── responses
//!                    │  │ headers, clientlib tags  │                │
//!                    │  └──────────────────────────┘                │
//!                    │                                              │
//!                    │  config · lifecycle · observability          │
//!                    └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use serde_json::json;
use tokio::net::TcpListener;

use aem_dev_proxy::config::load_config;
use aem_dev_proxy::http::HttpServer;
use aem_dev_proxy::lifecycle::{prepare, signals, Shutdown};
use aem_dev_proxy::observability::{logging, metrics};
use aem_dev_proxy::routing::Router;

#[derive(Parser)]
#[command(name = "aem-dev-proxy")]
#[command(about = "Development proxy that serves AEM pages with local clientlibs", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "aem-dev-proxy.toml")]
    config: PathBuf,

    /// Override `observability.log_level`.
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration, print the resolved context and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)?;
    let log_level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.observability.log_level.clone());
    logging::init_logging(&log_level);

    tracing::info!(
        config = %cli.config.display(),
        origin = %config.plugin.aem_url(),
        dev_server = %config.dev_server.url,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let prepared = prepare(config)?;

    if cli.check {
        let routes = Router::from_options(&prepared.config.plugin)?.summary();
        let report = json!({
            "context": prepared.context.as_ref(),
            "routes": routes,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if prepared.config.observability.metrics_enabled {
        match prepared.config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %prepared.config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let server = HttpServer::new(&prepared.config, prepared.context.clone())?;

    let listener = TcpListener::bind(prepared.config.server.bind_address()).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        "Listening for connections"
    );

    let shutdown = Arc::new(Shutdown::new());
    let receiver = shutdown.subscribe();
    tokio::spawn(signals::wait_for_signal(shutdown));

    server.run(listener, receiver).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

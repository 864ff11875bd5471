//! Startup orchestration.
//!
//! # Responsibilities
//! - Resolve the bundle entries and the local server address
//! - Freeze both into the shared [`DevContext`]
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The context is complete before the listener is bound

use std::sync::Arc;

use crate::config::{
    BuildInput, BundleEntries, ConfigError, ConfigStore, DevContext, ProxyConfig,
    ResolvedBuildConfig,
};

/// A validated configuration and its frozen context.
#[derive(Debug)]
pub struct Prepared {
    pub config: ProxyConfig,
    pub context: Arc<DevContext>,
}

/// Build the process context for a validated configuration.
pub fn prepare(config: ProxyConfig) -> Result<Prepared, ConfigError> {
    let context = build_context(&config)?;
    tracing::info!(
        entries = context.bundle_entries.len(),
        base = %context.build.base,
        local_url = %context.build.server.url(),
        "Development context ready"
    );

    Ok(Prepared {
        config,
        context: Arc::new(context),
    })
}

/// Fill the store from the build and server sections, then freeze it.
pub fn build_context(config: &ProxyConfig) -> Result<DevContext, ConfigError> {
    let store = ConfigStore::new();

    let input = BuildInput::from_value(config.build.input.as_ref())?;
    store.set_bundle_entries(BundleEntries::from(input));
    store.set_resolved_config(ResolvedBuildConfig::from(&config.server));

    store.freeze()
}

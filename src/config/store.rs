//! Process configuration store.
//!
//! Holds the two write-once values established before traffic flows: the
//! bundle entries and the resolved build configuration. Each slot keeps the
//! first value written; later writes are ignored. Once setup is done the store
//! is frozen into an immutable [`DevContext`] that request handlers share
//! through an `Arc`.
//!
//! Setup must finish before the listener is bound. The guard only pins the
//! first writer, it does not coordinate concurrent readers and writers.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use serde::Serialize;

use crate::config::entries::BundleEntries;
use crate::config::schema::ServerConfig;
use crate::config::ConfigError;

/// Plugin name that enables the fast-refresh preamble.
pub const REACT_REFRESH_PLUGIN: &str = "vite:react-refresh";

/// Local server address as resolved by the build tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalServer {
    pub host: String,
    pub port: u16,
}

impl LocalServer {
    /// `http://{host}:{port}`.
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Snapshot of the resolved build configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedBuildConfig {
    pub base: String,
    pub server: LocalServer,
    pub active_plugins: BTreeSet<String>,
}

impl ResolvedBuildConfig {
    pub fn is_plugin_active(&self, name: &str) -> bool {
        self.active_plugins.contains(name)
    }
}

impl From<&ServerConfig> for ResolvedBuildConfig {
    fn from(server: &ServerConfig) -> Self {
        Self {
            base: server.base.clone(),
            server: LocalServer {
                host: server.host.clone(),
                port: server.port,
            },
            active_plugins: server.plugins.iter().cloned().collect(),
        }
    }
}

/// Write-once slots filled during startup.
#[derive(Debug, Default)]
pub struct ConfigStore {
    bundle_entries: OnceLock<BundleEntries>,
    resolved: OnceLock<ResolvedBuildConfig>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the bundle entries unless already set. Returns whether the write
    /// took effect.
    pub fn set_bundle_entries(&self, entries: BundleEntries) -> bool {
        let stored = self.bundle_entries.set(entries).is_ok();
        if !stored {
            tracing::debug!("Bundle entries already set, ignoring");
        }
        stored
    }

    /// Store the resolved build configuration unless already set. Returns
    /// whether the write took effect.
    pub fn set_resolved_config(&self, config: ResolvedBuildConfig) -> bool {
        let stored = self.resolved.set(config).is_ok();
        if !stored {
            tracing::debug!("Resolved config already set, ignoring");
        }
        stored
    }

    pub fn bundle_entries(&self) -> Option<&BundleEntries> {
        self.bundle_entries.get()
    }

    pub fn resolved_config(&self) -> Option<&ResolvedBuildConfig> {
        self.resolved.get()
    }

    /// Consume the store, producing the immutable per-process context.
    pub fn freeze(self) -> Result<DevContext, ConfigError> {
        let bundle_entries = self
            .bundle_entries
            .into_inner()
            .ok_or(ConfigError::IncompleteStore("bundle entries"))?;
        let build = self
            .resolved
            .into_inner()
            .ok_or(ConfigError::IncompleteStore("resolved build config"))?;
        Ok(DevContext {
            bundle_entries,
            build,
        })
    }
}

/// Immutable configuration read by every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DevContext {
    pub bundle_entries: BundleEntries,
    pub build: ResolvedBuildConfig,
}

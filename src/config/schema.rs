//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Key formats the origin appends to versioned clientlib file names.
pub const DEFAULT_KEY_FORMAT_EXPRESSIONS: [&str; 3] = [
    r"lc-\w{32}-lc(?:\.min)?",
    r"(?:min\.)?ACSHASH\w{32}",
    r"\w{32}(?:\.min)?",
];

/// Root configuration for the development proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Origin and clientlib matching options.
    pub plugin: PluginOptions,

    /// Local server settings; also the source of the resolved build config.
    pub server: ServerConfig,

    /// Bundle entry input.
    pub build: BuildConfig,

    /// Upstream serving development assets.
    pub dev_server: DevServerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Options describing the origin and how its clientlibs are recognised.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct PluginOptions {
    /// Site segments under `/content/` whose pages get rewritten.
    pub content_paths: Vec<String>,

    /// Canonical clientlib path prefix, e.g. `/etc.clientlibs/site/clientlibs/main`.
    pub public_path: String,

    /// Regex prefix used instead of `public_path` when matching tags.
    pub clientlibs_expression: Option<String>,

    /// Extra hash/version formats accepted between the prefix and the extension.
    pub key_format_expressions: Option<Vec<String>>,

    /// Extra top-level origin path segments to proxy.
    pub aem_proxy_segments: Option<Vec<String>>,

    /// Origin server location.
    pub aem: Option<AemServerOptions>,
}

impl PluginOptions {
    /// Build options with the two required fields.
    ///
    /// Fails when `public_path` is empty.
    pub fn new(
        content_paths: Vec<String>,
        public_path: impl Into<String>,
    ) -> Result<Self, crate::config::ConfigError> {
        let options = Self {
            content_paths,
            public_path: public_path.into(),
            ..Self::default()
        };
        if options.public_path.is_empty() {
            return Err(crate::config::ConfigError::Validation(vec![
                crate::config::ValidationError::MissingPublicPath,
            ]));
        }
        Ok(options)
    }

    /// The prefix the clientlib pattern is built from.
    pub fn clientlib_prefix(&self) -> &str {
        self.clientlibs_expression
            .as_deref()
            .unwrap_or(&self.public_path)
    }

    /// Custom key formats followed by the defaults, without duplicates.
    pub fn key_format_expressions(&self) -> Vec<String> {
        let mut expressions: Vec<String> = Vec::new();
        let mut push = |expression: &str| {
            if !expressions.iter().any(|e| e == expression) {
                expressions.push(expression.to_string());
            }
        };
        for expression in self.key_format_expressions.iter().flatten() {
            push(expression);
        }
        for expression in DEFAULT_KEY_FORMAT_EXPRESSIONS {
            push(expression);
        }
        expressions
    }

    /// Origin host and port, falling back to `localhost:4502`.
    pub fn aem_server(&self) -> AemServerOptions {
        self.aem.clone().unwrap_or_default()
    }

    /// Base URL of the origin, e.g. `http://localhost:4502`.
    pub fn aem_url(&self) -> String {
        let aem = self.aem_server();
        format!("http://{}:{}", aem.host, aem.port)
    }
}

/// Origin server host and port.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct AemServerOptions {
    /// Host name or IP address.
    pub host: String,

    /// Port number.
    pub port: u16,
}

impl Default for AemServerOptions {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 4502,
        }
    }
}

/// Local server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host the proxy listens on and advertises in rewritten headers.
    pub host: String,

    /// Port the proxy listens on.
    pub port: u16,

    /// Public base path of the development assets.
    pub base: String,

    /// Names of the active feature plugins (e.g. `vite:react-refresh`).
    pub plugins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3000,
            base: "/".to_string(),
            plugins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Address to bind the listener to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Build input configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BuildConfig {
    /// Entry input: a path, an array of paths or a table of named paths.
    pub input: Option<toml::Value>,
}

/// Development asset server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DevServerConfig {
    /// Base URL requests outside the origin routes are forwarded to.
    pub url: String,
}

impl Default for DevServerConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:5173".to_string(),
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

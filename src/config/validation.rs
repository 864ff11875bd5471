//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that every user-supplied expression compiles
//! - Validate value ranges (timeouts > 0, ports valid)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use regex::Regex;
use thiserror::Error;
use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("A public path is required for the proxy server to find and inject the development server!")]
    MissingPublicPath,

    #[error("At least one content path is required")]
    MissingContentPaths,

    #[error("{field} is not a valid expression: {reason}")]
    InvalidExpression { field: &'static str, reason: String },

    #[error("{field} must be a non-zero port")]
    InvalidPort { field: &'static str },

    #[error("server.host must not be empty")]
    MissingHost,

    #[error("dev_server.url must be an absolute http URL, got {0:?}")]
    InvalidDevServerUrl(String),

    #[error("timeouts.request_secs must be greater than zero")]
    InvalidTimeout,
}

/// Validate a deserialized configuration.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let plugin = &config.plugin;

    if plugin.public_path.is_empty() {
        errors.push(ValidationError::MissingPublicPath);
    }
    if plugin.content_paths.is_empty() {
        errors.push(ValidationError::MissingContentPaths);
    }

    if let Some(expression) = &plugin.clientlibs_expression {
        check_expression("plugin.clientlibs_expression", expression, &mut errors);
    }
    for expression in plugin.key_format_expressions.iter().flatten() {
        check_expression("plugin.key_format_expressions", expression, &mut errors);
    }
    for segment in plugin.aem_proxy_segments.iter().flatten() {
        check_expression("plugin.aem_proxy_segments", segment, &mut errors);
    }

    if plugin.aem_server().port == 0 {
        errors.push(ValidationError::InvalidPort { field: "plugin.aem.port" });
    }
    if config.server.port == 0 {
        errors.push(ValidationError::InvalidPort { field: "server.port" });
    }
    if config.server.host.is_empty() {
        errors.push(ValidationError::MissingHost);
    }

    match Url::parse(&config.dev_server.url) {
        Ok(url) if url.scheme() == "http" && url.host_str().is_some() => {}
        _ => errors.push(ValidationError::InvalidDevServerUrl(
            config.dev_server.url.clone(),
        )),
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::InvalidTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_expression(field: &'static str, expression: &str, errors: &mut Vec<ValidationError>) {
    if let Err(e) = Regex::new(expression) {
        errors.push(ValidationError::InvalidExpression {
            field,
            reason: e.to_string(),
        });
    }
}

//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading and resolution.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("No input option(s) was provided via build.input.")]
    MissingBuildInput,

    #[error("Invalid value detected for build.input: {0}")]
    InvalidBuildInput(String),

    #[error("Configuration store is incomplete: {0} was never set")]
    IncompleteStore(&'static str),

    #[error("Invalid clientlib pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Invalid upstream URL {url:?}: {reason}")]
    Upstream { url: String, reason: String },
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ProxyConfig, ConfigError> {
    let config: ProxyConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(
            r#"
            [plugin]
            content_paths = ["we-retail"]
            public_path = "/etc.clientlibs/we-retail/clientlibs/clientlib-site"
            key_format_expressions = ["custom\\w{8}"]

            [plugin.aem]
            host = "aem.local"
            port = 4503

            [server]
            host = "127.0.0.1"
            port = 3100
            plugins = ["vite:react-refresh"]

            [build]
            input = ["src/main.ts", "src/main.ts"]

            [dev_server]
            url = "http://127.0.0.1:5173"
            "#,
        )
        .unwrap();

        assert_eq!(config.plugin.aem_url(), "http://aem.local:4503");
        assert_eq!(config.server.bind_address(), "127.0.0.1:3100");
        assert_eq!(config.server.plugins, vec!["vite:react-refresh".to_string()]);
    }

    #[test]
    fn test_missing_public_path_is_fatal() {
        let err = parse_config(
            r#"
            [plugin]
            content_paths = ["we-retail"]
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("A public path is required"));
    }

    #[test]
    fn test_non_array_key_formats_is_parse_error() {
        let err = parse_config(
            r#"
            [plugin]
            content_paths = ["we-retail"]
            public_path = "/etc.clientlibs/x"
            key_format_expressions = "not-an-array"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/aem-dev-proxy.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}

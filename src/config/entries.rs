//! Bundle entry resolution.
//!
//! The build input arrives in one of three shapes and is decided once, at
//! configuration time:
//!
//! ```text
//! input = "src/main.ts"                         → Single
//! input = ["src/a.ts", "src/b.ts"]              → List   (duplicates dropped)
//! input = { main = "src/main.ts", ... }         → Named  (values, in order)
//! ```
//!
//! Anything else is rejected.

use serde::Serialize;

use crate::config::ConfigError;

/// The build input, as a tagged variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildInput {
    /// A single entry path.
    Single(String),
    /// An ordered list of entry paths.
    List(Vec<String>),
    /// Named entries; only the paths are kept, in declaration order.
    Named(Vec<(String, String)>),
}

impl BuildInput {
    /// Decide the shape of an optional raw TOML value.
    pub fn from_value(value: Option<&toml::Value>) -> Result<Self, ConfigError> {
        match value {
            None => Err(ConfigError::MissingBuildInput),
            Some(value) => Self::try_from(value),
        }
    }
}

impl TryFrom<&toml::Value> for BuildInput {
    type Error = ConfigError;

    fn try_from(value: &toml::Value) -> Result<Self, Self::Error> {
        match value {
            toml::Value::String(path) => Ok(Self::Single(path.clone())),
            toml::Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    toml::Value::String(path) => Ok(path.clone()),
                    other => Err(invalid(other)),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Self::List),
            toml::Value::Table(table) => table
                .iter()
                .map(|(name, item)| match item {
                    toml::Value::String(path) => Ok((name.clone(), path.clone())),
                    other => Err(invalid(other)),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Named),
            other => Err(invalid(other)),
        }
    }
}

fn invalid(value: &toml::Value) -> ConfigError {
    ConfigError::InvalidBuildInput(format!("unexpected {}", value.type_str()))
}

/// Ordered, deduplicated module and style source paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BundleEntries(Vec<String>);

impl BundleEntries {
    /// Keep the first occurrence of every path.
    pub fn new<I>(paths: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut entries: Vec<String> = Vec::new();
        for path in paths {
            if !entries.contains(&path) {
                entries.push(path);
            }
        }
        Self(entries)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BuildInput> for BundleEntries {
    fn from(input: BuildInput) -> Self {
        match input {
            BuildInput::Single(path) => Self(vec![path]),
            BuildInput::List(paths) => Self::new(paths),
            BuildInput::Named(named) => Self::new(named.into_iter().map(|(_, path)| path)),
        }
    }
}

//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → entries.rs (build input → bundle entries)
//!     → store.rs (set-once slots, frozen into DevContext)
//!     → shared via Arc to every request handler
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod entries;
pub mod loader;
pub mod schema;
pub mod store;
pub mod validation;

pub use entries::{BuildInput, BundleEntries};
pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    AemServerOptions, BuildConfig, DevServerConfig, ObservabilityConfig, PluginOptions,
    ProxyConfig, ServerConfig, TimeoutConfig,
};
pub use store::{ConfigStore, DevContext, LocalServer, ResolvedBuildConfig};
pub use validation::{validate_config, ValidationError};

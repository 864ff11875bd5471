//! AEM development proxy library.
//!
//! Sits between the browser and an AEM origin, swapping the origin's
//! clientlib tags for a local build tool's development markup.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod rewrite;
pub mod routing;

pub use config::schema::ProxyConfig;
pub use config::DevContext;
pub use http::HttpServer;
pub use lifecycle::Shutdown;

//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → routing (origin route or dev server)
//!     → request.rs (retarget URI, Host, strip hop-by-hop)
//!     → upstream
//!     → response.rs (strip hop-by-hop)
//!     → rewrite (origin responses only)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{ForwardError, UpstreamTarget};
pub use server::HttpServer;

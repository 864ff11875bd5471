//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path)
//!     → router.rs (route lookup)
//!     → matcher.rs (evaluate path expression)
//!     → Return: origin route, or the dev server fallback
//!
//! Route Compilation (at startup):
//!     PluginOptions
//!     → content route   ^/content/(<content paths>)/.*   intercept
//!     → segments route  ^/(<origin segments>)/.*         passthrough
//!     → root route      ^/(index.html)?$                 passthrough
//!     → Freeze as immutable Router
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Deterministic: same input always matches same route
//! - First match wins

pub mod matcher;
pub mod router;

pub use router::{RouteMatch, RouteMode, Router, Upstream};

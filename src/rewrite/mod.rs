//! Origin response rewriting engine.
//!
//! Decides per response whether the body is HTML, and if so swaps the
//! origin's clientlib tags for development markup. Absolute origin URLs in
//! headers are rewritten for every response.

pub mod classify;
pub mod decoder;
pub mod failure;
pub mod headers;
pub mod interceptor;
pub mod markup;
pub mod pattern;
pub mod tags;

pub use classify::ContentClass;
pub use decoder::{BodyAccumulator, DecodeError};
pub use failure::failure_response;
pub use headers::HeaderRewriter;
pub use interceptor::ResponseInterceptor;
pub use markup::dev_markup;
pub use pattern::{ClientlibMatch, ClientlibPattern};
pub use tags::{rewrite_clientlibs, Rewrite};

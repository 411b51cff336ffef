//! Site migration redirector library.
//!
//! Resolves requests against the old site into either `410 Gone` or a
//! redirect to the same content on a new origin.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::RedirectorConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{RedirectResolver, ResolveResult};

//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, catch-all handler)
//!     → request.rs (rebuild absolute request URL)
//!     → routing::RedirectResolver (gone / redirect decision)
//!     → response.rs (410 or 3xx + Location)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{request_url, RequestUrlError};
pub use server::{AppState, HttpServer};

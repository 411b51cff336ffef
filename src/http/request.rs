//! Request URL reconstruction.
//!
//! # Responsibilities
//! - Rebuild the absolute URL the client asked for (scheme, host, path, query)
//! - Reject hosts that would change how the URL parses
//!
//! # Design Decisions
//! - `X-Forwarded-Proto` is honoured for http/https only
//! - Request authority (HTTP/2, absolute-form) wins over the `Host` header
//! - A missing host falls back to `localhost`; only the path and query
//!   influence resolution

use axum::http::{header::HOST, request::Parts, uri::Authority};
use thiserror::Error;
use url::Url;

pub const X_FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Error type for malformed request targets.
#[derive(Debug, Error)]
pub enum RequestUrlError {
    #[error("invalid host `{0}`")]
    InvalidHost(String),

    #[error("request target must be an absolute path: `{0}`")]
    InvalidTarget(String),

    #[error("invalid request URL: {0}")]
    Parse(#[from] url::ParseError),
}

/// Absolute URL of the incoming request.
pub fn request_url(parts: &Parts) -> Result<Url, RequestUrlError> {
    let scheme = parts
        .headers
        .get(X_FORWARDED_PROTO)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|proto| matches!(*proto, "http" | "https"))
        .or_else(|| parts.uri.scheme_str())
        .unwrap_or("http");

    let authority = match parts.uri.authority() {
        Some(authority) => authority.clone(),
        None => match parts.headers.get(HOST) {
            Some(value) => {
                let host = value
                    .to_str()
                    .map_err(|_| RequestUrlError::InvalidHost(format!("{value:?}")))?;
                host.parse::<Authority>()
                    .map_err(|_| RequestUrlError::InvalidHost(host.to_owned()))?
            }
            None => Authority::from_static("localhost"),
        },
    };

    let target = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    if !target.starts_with('/') {
        return Err(RequestUrlError::InvalidTarget(target.to_owned()));
    }

    Ok(Url::parse(&format!("{scheme}://{authority}{target}"))?)
}

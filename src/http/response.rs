//! Translation of resolver decisions into HTTP responses.
//!
//! - `Gone` → 410 with an empty body
//! - `Redirect` → the configured status with a `Location` header

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::routing::{RedirectCode, ResolveResult};

impl From<RedirectCode> for StatusCode {
    fn from(code: RedirectCode) -> Self {
        match code {
            RedirectCode::MovedPermanently => StatusCode::MOVED_PERMANENTLY,
            RedirectCode::Found => StatusCode::FOUND,
            RedirectCode::SeeOther => StatusCode::SEE_OTHER,
            RedirectCode::TemporaryRedirect => StatusCode::TEMPORARY_REDIRECT,
            RedirectCode::PermanentRedirect => StatusCode::PERMANENT_REDIRECT,
        }
    }
}

impl IntoResponse for ResolveResult {
    fn into_response(self) -> Response {
        match self {
            ResolveResult::Gone => (StatusCode::GONE, Body::empty()).into_response(),
            ResolveResult::Redirect { target, code } => match HeaderValue::from_str(&target) {
                Ok(location) => (
                    StatusCode::from(code),
                    [(header::LOCATION, location)],
                    Body::empty(),
                )
                    .into_response(),
                Err(e) => {
                    tracing::error!(location = %target, error = %e, "Redirect target is not a valid header value");
                    StatusCode::INTERNAL_SERVER_ERROR.into_response()
                }
            },
        }
    }
}

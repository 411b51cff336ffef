//! Core value types shared by the redirect pipeline.
//!
//! `Pathname` and `Origin` are only constructed through checked factories,
//! so every table and resolver downstream can rely on their invariants.

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::routing::normalize::NormalizationPolicy;

/// Errors raised while building rule tables or configuration values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    /// Pathname is empty, relative, or carries a query/fragment.
    #[error("invalid pathname `{0}`: must start with `/` and contain no `?` or `#`")]
    InvalidPathname(String),

    /// Origin is not an absolute http(s) URL without path.
    #[error("invalid origin `{value}`: {reason}")]
    InvalidOrigin { value: String, reason: String },

    /// Status code is not one of the redirect codes.
    #[error("invalid redirect status code {0}: expected one of 301, 302, 303, 307, 308")]
    InvalidRedirectCode(u16),

    /// Pattern or destination template could not be compiled.
    #[error("invalid pattern `{template}`: {reason}")]
    InvalidPattern { template: String, reason: String },
}

/// Absolute pathname: non-empty, starts with `/`, no query or fragment.
///
/// Stored in the percent-encoded form [`Url::path`] produces, so a value
/// read from config compares equal to the same path taken off a request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pathname(String);

impl Pathname {
    /// Validate a pathname and bring it into encoded form.
    pub fn parse(value: impl Into<String>) -> Result<Self, RuleError> {
        let value = value.into();
        if !value.starts_with('/') || value.contains(['?', '#']) {
            return Err(RuleError::InvalidPathname(value));
        }
        match encode_path(&value) {
            Some(encoded) => Ok(Self(encoded)),
            None => Err(RuleError::InvalidPathname(value)),
        }
    }

    /// Take the pathname of an already-parsed URL.
    ///
    /// Special schemes (http, https) always serialize a leading `/`; for
    /// anything else one is prepended.
    pub fn from_url(url: &Url) -> Self {
        let path = url.path();
        if path.starts_with('/') {
            Self(path.to_owned())
        } else {
            Self(format!("/{path}"))
        }
    }

    /// Wrap a string the caller has already proven to start with `/` and
    /// to be free of `?` and `#`.
    pub(crate) fn from_trusted(value: String) -> Self {
        debug_assert!(value.starts_with('/'));
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Pathname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Pathname {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Percent-encode an absolute path exactly as an incoming request path
/// would be: spaces and non-ASCII become escapes, existing escapes stay
/// as written, dot segments are resolved.
pub(crate) fn encode_path(path: &str) -> Option<String> {
    let url = Url::parse(&format!("http://localhost{path}")).ok()?;
    Some(url.path().to_owned())
}

/// Scheme + host (+ port) of the site requests are redirected to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin(Url);

impl Origin {
    /// Validate an origin string such as `https://new.example`.
    ///
    /// A single trailing `/` is tolerated; any other path, a query, a
    /// fragment or credentials are rejected.
    pub fn parse(value: &str) -> Result<Self, RuleError> {
        let invalid = |reason: &str| RuleError::InvalidOrigin {
            value: value.to_owned(),
            reason: reason.to_owned(),
        };

        if !(value.starts_with("http://") || value.starts_with("https://")) {
            return Err(invalid("must begin with http:// or https://"));
        }

        let url = Url::parse(value).map_err(|e| invalid(&e.to_string()))?;
        if url.host_str().map_or(true, str::is_empty) {
            return Err(invalid("missing host"));
        }
        if url.path() != "/" {
            return Err(invalid("must not contain a path"));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(invalid("must not contain a query or fragment"));
        }
        if !url.username().is_empty() || url.password().is_some() {
            return Err(invalid("must not contain credentials"));
        }

        Ok(Self(url))
    }

    /// Base URL (path `/`) used as the starting point for target URLs.
    pub fn as_url(&self) -> &Url {
        &self.0
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.origin().ascii_serialization())
    }
}

/// HTTP status codes the resolver may emit for a redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(into = "u16")]
pub enum RedirectCode {
    MovedPermanently,
    Found,
    SeeOther,
    TemporaryRedirect,
    #[default]
    PermanentRedirect,
}

impl RedirectCode {
    pub fn as_u16(self) -> u16 {
        match self {
            RedirectCode::MovedPermanently => 301,
            RedirectCode::Found => 302,
            RedirectCode::SeeOther => 303,
            RedirectCode::TemporaryRedirect => 307,
            RedirectCode::PermanentRedirect => 308,
        }
    }
}

impl TryFrom<u16> for RedirectCode {
    type Error = RuleError;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        match code {
            301 => Ok(RedirectCode::MovedPermanently),
            302 => Ok(RedirectCode::Found),
            303 => Ok(RedirectCode::SeeOther),
            307 => Ok(RedirectCode::TemporaryRedirect),
            308 => Ok(RedirectCode::PermanentRedirect),
            other => Err(RuleError::InvalidRedirectCode(other)),
        }
    }
}

impl From<RedirectCode> for u16 {
    fn from(code: RedirectCode) -> Self {
        code.as_u16()
    }
}

impl fmt::Display for RedirectCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u16())
    }
}

/// Outcome of resolving a single request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ResolveResult {
    /// 410 Gone.
    Gone,
    /// Redirect to an absolute URL on the new origin.
    Redirect { target: String, code: RedirectCode },
}

/// Immutable startup configuration: where to redirect and how to
/// canonicalize incoming paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub new_origin: Origin,
    pub policy: NormalizationPolicy,
}

impl AppConfig {
    pub fn new(new_origin: Origin, policy: NormalizationPolicy) -> Self {
        Self { new_origin, policy }
    }
}

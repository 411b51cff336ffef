//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! redirector. All types derive Serde traits for deserialization from
//! config files. Values stay as plain strings here; `validation.rs` turns
//! them into checked pathnames, origins and templates.

use serde::{Deserialize, Serialize};

use crate::routing::normalize::{NormalizationPolicy, TrailingSlash};

/// Root configuration for the redirector.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RedirectorConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Redirect rules and normalization policy.
    pub redirect: RedirectConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Redirect rules for the old site.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RedirectConfig {
    /// Origin every redirect points at (e.g., "https://new.example").
    pub new_origin: String,

    /// Status code for every redirect (301, 302, 303, 307 or 308).
    pub permanent_code: u16,

    /// Fold request paths to lowercase before table lookup.
    pub lowercase: bool,

    /// Trailing slash handling: preserve, strip or ensure.
    pub trailing_slash: TrailingSlash,

    /// Exact path redirects, later entries override earlier ones.
    pub exact: Vec<ExactRuleConfig>,

    /// Paths answered with 410 Gone.
    pub gone: Vec<String>,

    /// Pattern redirects in priority order.
    pub patterns: Vec<PatternRuleConfig>,
}

impl RedirectConfig {
    /// Normalization policy described by this section.
    pub fn policy(&self) -> NormalizationPolicy {
        NormalizationPolicy {
            lowercase: self.lowercase,
            trailing_slash: self.trailing_slash,
        }
    }
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self {
            new_origin: String::new(),
            permanent_code: 308,
            lowercase: false,
            trailing_slash: TrailingSlash::Preserve,
            exact: Vec::new(),
            gone: Vec::new(),
            patterns: Vec::new(),
        }
    }
}

/// A single exact redirect.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExactRuleConfig {
    /// Source pathname.
    pub from: String,

    /// Destination pathname on the new origin.
    pub to: String,
}

/// A single pattern redirect.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PatternRuleConfig {
    /// Path template, e.g. "/lab/:rest*".
    pub pattern: String,

    /// Destination template, e.g. "/projects/lab/:rest".
    pub to: String,
}

//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check every pathname, the origin and every pattern template
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RedirectorConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::RedirectorConfig;
use crate::routing::matcher::TemplateRule;
use crate::routing::types::{Origin, Pathname, RedirectCode, RuleError};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address: invalid socket address `{0}`")]
    BindAddress(String),

    #[error("observability.metrics_address: invalid socket address `{0}`")]
    MetricsAddress(String),

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroTimeout,

    #[error("redirect.new_origin is required")]
    MissingOrigin,

    #[error("redirect.new_origin: {0}")]
    Origin(RuleError),

    #[error("redirect.permanent_code: {0}")]
    RedirectCode(RuleError),

    #[error("redirect.exact[{index}].{field}: {error}")]
    ExactRule {
        index: usize,
        field: &'static str,
        error: RuleError,
    },

    #[error("redirect.gone[{index}]: {error}")]
    GonePath { index: usize, error: RuleError },

    #[error("redirect.patterns[{index}]: {error}")]
    PatternRule { index: usize, error: RuleError },
}

/// Validate the full configuration, collecting every problem found.
pub fn validate_config(config: &RedirectorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    let redirect = &config.redirect;

    if redirect.new_origin.trim().is_empty() {
        errors.push(ValidationError::MissingOrigin);
    } else if let Err(e) = Origin::parse(&redirect.new_origin) {
        errors.push(ValidationError::Origin(e));
    }

    if let Err(e) = RedirectCode::try_from(redirect.permanent_code) {
        errors.push(ValidationError::RedirectCode(e));
    }

    for (index, rule) in redirect.exact.iter().enumerate() {
        for (field, value) in [("from", &rule.from), ("to", &rule.to)] {
            if let Err(error) = Pathname::parse(value.as_str()) {
                errors.push(ValidationError::ExactRule {
                    index,
                    field,
                    error,
                });
            }
        }
    }

    for (index, path) in redirect.gone.iter().enumerate() {
        if let Err(error) = Pathname::parse(path.as_str()) {
            errors.push(ValidationError::GonePath { index, error });
        }
    }

    for (index, rule) in redirect.patterns.iter().enumerate() {
        if let Err(error) = TemplateRule::new(&rule.pattern, &rule.to) {
            errors.push(ValidationError::PatternRule { index, error });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

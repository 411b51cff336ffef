//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RedirectorConfig (validated, immutable)
//!     → RedirectResolver::from_config (compiled once at startup)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields except `redirect.new_origin` have defaults
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::ExactRuleConfig;
pub use schema::ListenerConfig;
pub use schema::ObservabilityConfig;
pub use schema::PatternRuleConfig;
pub use schema::RedirectConfig;
pub use schema::RedirectorConfig;
pub use schema::TimeoutConfig;
pub use validation::{validate_config, ValidationError};

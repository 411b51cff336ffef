//! Redirect routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request URL
//!     → normalize.rs (lowercase, trailing slash)
//!     → rules.rs (gone set, exact table)
//!     → matcher.rs (ordered pattern rules, original URL)
//!     → target.rs (new origin + path + query + fragment)
//!     → Return: ResolveResult (Gone or Redirect)
//!
//! Rule Compilation (at startup):
//!     RedirectConfig
//!     → Validate origin, pathnames, templates
//!     → Normalize table keys under the policy
//!     → Freeze as immutable RedirectResolver
//! ```
//!
//! # Design Decisions
//! - Rules compiled at startup, immutable at runtime
//! - No regex in hot path (hash lookups, linear segment walk)
//! - Deterministic: same input always resolves the same way
//! - First match wins; unmatched requests fall back, never 404

pub mod matcher;
pub mod normalize;
pub mod resolver;
pub mod rules;
pub mod target;
pub mod types;

pub use matcher::{Captures, PathPattern, PatternRule, TemplateRule};
pub use normalize::{normalize_path, NormalizationPolicy, TrailingSlash};
pub use resolver::{MatchStage, RedirectResolver, Resolution, ResolverDeps};
pub use rules::{ExactRules, GoneRules, PatternRules};
pub use target::{build_target_url, TargetParts, TargetUrlBuilder};
pub use types::{AppConfig, Origin, Pathname, RedirectCode, ResolveResult, RuleError};

//! Pathname canonicalization.
//!
//! # Design Decisions
//! - Case folding is ASCII-only; percent-encoded bytes are left alone
//! - Trailing-slash handling runs after case folding
//! - `/` is never stripped

use serde::{Deserialize, Serialize};

use crate::routing::types::Pathname;

/// Trailing-slash strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrailingSlash {
    #[default]
    Preserve,
    Strip,
    Ensure,
}

/// Normalization flags, fixed at startup and applied to every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct NormalizationPolicy {
    /// Fold the path to lowercase before lookup.
    pub lowercase: bool,

    /// What to do with a trailing `/`.
    pub trailing_slash: TrailingSlash,
}

impl NormalizationPolicy {
    /// Normalize `path` under this policy.
    pub fn normalize(&self, path: &Pathname) -> Pathname {
        normalize_path(path, self)
    }
}

/// Canonicalize an absolute pathname.
pub fn normalize_path(path: &Pathname, policy: &NormalizationPolicy) -> Pathname {
    let mut p = if policy.lowercase {
        fold_case(path.as_str())
    } else {
        path.as_str().to_owned()
    };

    match policy.trailing_slash {
        TrailingSlash::Strip => {
            if p != "/" && p.ends_with('/') {
                p.pop();
            }
        }
        TrailingSlash::Ensure => {
            if !p.ends_with('/') {
                p.push('/');
            }
        }
        TrailingSlash::Preserve => {}
    }

    // Folding and slash edits keep the leading `/` and add no `?`/`#`.
    Pathname::from_trusted(p)
}

/// ASCII lowercase, skipping the two hex digits after each `%`.
fn fold_case(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut escape = 0;
    for c in path.chars() {
        if escape > 0 {
            escape -= 1;
            out.push(c);
        } else if c == '%' {
            escape = 2;
            out.push(c);
        } else {
            out.push(c.to_ascii_lowercase());
        }
    }
    out
}

//! Immutable rule tables.
//!
//! # Design Decisions
//! - Built once at startup, read-only afterwards
//! - Exact table: later duplicate keys overwrite earlier ones
//! - Pattern list: declaration order is match priority

use std::collections::{HashMap, HashSet};

use crate::routing::matcher::PatternRule;
use crate::routing::normalize::NormalizationPolicy;
use crate::routing::types::Pathname;

/// Exact pathname redirects (from -> to).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExactRules {
    map: HashMap<Pathname, Pathname>,
}

impl ExactRules {
    pub fn build(pairs: impl IntoIterator<Item = (Pathname, Pathname)>) -> Self {
        Self {
            map: pairs.into_iter().collect(),
        }
    }

    pub fn get(&self, from: &Pathname) -> Option<&Pathname> {
        self.map.get(from)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Like [`ExactRules::build`], with each `from` key normalized under
    /// `policy` first. Targets are kept verbatim; keys that collide after
    /// normalization still resolve last-write-wins in input order.
    pub fn build_normalized(
        pairs: impl IntoIterator<Item = (Pathname, Pathname)>,
        policy: &NormalizationPolicy,
    ) -> Self {
        Self::build(
            pairs
                .into_iter()
                .map(|(from, to)| (policy.normalize(&from), to)),
        )
    }
}

/// Pathnames answered with 410 Gone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoneRules {
    set: HashSet<Pathname>,
}

impl GoneRules {
    pub fn build(paths: impl IntoIterator<Item = Pathname>) -> Self {
        Self {
            set: paths.into_iter().collect(),
        }
    }

    pub fn contains(&self, path: &Pathname) -> bool {
        self.set.contains(path)
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    pub fn build_normalized(
        paths: impl IntoIterator<Item = Pathname>,
        policy: &NormalizationPolicy,
    ) -> Self {
        Self::build(paths.into_iter().map(|p| policy.normalize(&p)))
    }
}

/// Ordered pattern rules; the first match wins.
#[derive(Debug, Default)]
pub struct PatternRules {
    rules: Vec<Box<dyn PatternRule>>,
}

impl PatternRules {
    pub fn build(rules: impl IntoIterator<Item = Box<dyn PatternRule>>) -> Self {
        Self {
            rules: rules.into_iter().collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn PatternRule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

//! Redirect resolution pipeline.
//!
//! # Responsibilities
//! - Normalize the request pathname under the configured policy
//! - Run gone → exact → pattern → fallback, first match wins
//! - Carry the original query and fragment onto the target
//!
//! # Design Decisions
//! - Immutable after construction (shared across requests without locks)
//! - Pattern rules see the original URL, never the normalized path
//! - Total over well-formed input: unmatched requests fall back to the
//!   same path on the new origin

use std::fmt;

use axum::http::request::Parts;
use serde::Serialize;
use url::Url;

use crate::config::schema::RedirectConfig;
use crate::routing::matcher::{PatternRule, TemplateRule};
use crate::routing::normalize::NormalizationPolicy;
use crate::routing::rules::{ExactRules, GoneRules, PatternRules};
use crate::routing::target::{TargetParts, TargetUrlBuilder};
use crate::routing::types::{AppConfig, Origin, Pathname, RedirectCode, ResolveResult, RuleError};

/// Pipeline stage that produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStage {
    Gone,
    Exact,
    Pattern,
    Fallback,
}

impl MatchStage {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchStage::Gone => "gone",
            MatchStage::Exact => "exact",
            MatchStage::Pattern => "pattern",
            MatchStage::Fallback => "fallback",
        }
    }
}

impl fmt::Display for MatchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A result together with the stage that decided it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub stage: MatchStage,
    pub result: ResolveResult,
}

/// Everything the resolver needs, assembled once at startup.
#[derive(Debug)]
pub struct ResolverDeps {
    pub policy: NormalizationPolicy,
    pub target: TargetUrlBuilder,
    pub exact: ExactRules,
    pub gone: GoneRules,
    pub patterns: PatternRules,
    pub permanent_code: RedirectCode,
}

/// Resolves requests into gone/redirect decisions.
#[derive(Debug)]
pub struct RedirectResolver {
    policy: NormalizationPolicy,
    target: TargetUrlBuilder,
    exact: ExactRules,
    gone: GoneRules,
    patterns: PatternRules,
    permanent_code: RedirectCode,
}

impl RedirectResolver {
    /// Create a resolver from prepared tables.
    ///
    /// Table keys are used as given; callers that want them reachable
    /// under a case-folding or slash policy should build the tables with
    /// `build_normalized`.
    pub fn new(deps: ResolverDeps) -> Self {
        Self {
            policy: deps.policy,
            target: deps.target,
            exact: deps.exact,
            gone: deps.gone,
            patterns: deps.patterns,
            permanent_code: deps.permanent_code,
        }
    }

    /// Compile the `[redirect]` config section.
    pub fn from_config(config: &RedirectConfig) -> Result<Self, RuleError> {
        let origin = Origin::parse(&config.new_origin)?;
        let app = AppConfig::new(origin, config.policy());
        let permanent_code = RedirectCode::try_from(config.permanent_code)?;

        let exact_pairs = config
            .exact
            .iter()
            .map(|rule| -> Result<_, RuleError> {
                Ok((Pathname::parse(&rule.from)?, Pathname::parse(&rule.to)?))
            })
            .collect::<Result<Vec<_>, RuleError>>()?;

        let gone_paths = config
            .gone
            .iter()
            .map(|p| Pathname::parse(p.as_str()))
            .collect::<Result<Vec<_>, RuleError>>()?;

        let patterns = config
            .patterns
            .iter()
            .map(|rule| {
                TemplateRule::new(&rule.pattern, &rule.to)
                    .map(|r| Box::new(r) as Box<dyn PatternRule>)
            })
            .collect::<Result<Vec<_>, RuleError>>()?;

        Ok(Self::new(ResolverDeps {
            exact: ExactRules::build_normalized(exact_pairs, &app.policy),
            gone: GoneRules::build_normalized(gone_paths, &app.policy),
            patterns: PatternRules::build(patterns),
            target: TargetUrlBuilder::new(app.new_origin),
            policy: app.policy,
            permanent_code,
        }))
    }

    /// Resolve a request.
    pub fn resolve(&self, req: &Parts, url: &Url) -> ResolveResult {
        self.resolve_with_stage(req, url).result
    }

    /// Resolve a request and report which stage decided it.
    pub fn resolve_with_stage(&self, req: &Parts, url: &Url) -> Resolution {
        let parts = TargetParts::from_url(url);
        let normalized = self.policy.normalize(&Pathname::from_url(url));

        // 1. Gone
        if self.gone.contains(&normalized) {
            return Resolution {
                stage: MatchStage::Gone,
                result: ResolveResult::Gone,
            };
        }

        // 2. Exact
        if let Some(to) = self.exact.get(&normalized) {
            return self.redirect(MatchStage::Exact, to, parts);
        }

        // 3. Patterns, first match wins
        for rule in self.patterns.iter() {
            if let Some(captures) = rule.matches(url) {
                let to = rule.destination(&captures, req);
                return self.redirect(MatchStage::Pattern, &to, parts);
            }
        }

        // 4. Same path on the new origin
        self.redirect(MatchStage::Fallback, &normalized, parts)
    }

    fn redirect(&self, stage: MatchStage, to: &Pathname, parts: TargetParts<'_>) -> Resolution {
        Resolution {
            stage,
            result: ResolveResult::Redirect {
                target: self.target.build(to, parts),
                code: self.permanent_code,
            },
        }
    }

    pub fn origin(&self) -> &Origin {
        self.target.origin()
    }

    pub fn policy(&self) -> &NormalizationPolicy {
        &self.policy
    }

    pub fn permanent_code(&self) -> RedirectCode {
        self.permanent_code
    }

    /// Rule counts as (exact, gone, patterns).
    pub fn rule_counts(&self) -> (usize, usize, usize) {
        (self.exact.len(), self.gone.len(), self.patterns.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{ExactRuleConfig, PatternRuleConfig};
    use crate::routing::matcher::Captures;
    use crate::routing::normalize::TrailingSlash;
    use axum::http::Request;

    fn path(p: &str) -> Pathname {
        Pathname::parse(p).unwrap()
    }

    fn request(url: &str) -> (Parts, Url) {
        let url = Url::parse(url).unwrap();
        let parts = Request::builder()
            .uri(url.path())
            .body(())
            .unwrap()
            .into_parts()
            .0;
        (parts, url)
    }

    fn resolver(
        policy: NormalizationPolicy,
        exact: &[(&str, &str)],
        gone: &[&str],
        patterns: &[(&str, &str)],
    ) -> RedirectResolver {
        RedirectResolver::new(ResolverDeps {
            exact: ExactRules::build_normalized(
                exact.iter().map(|(f, t)| (path(f), path(t))),
                &policy,
            ),
            gone: GoneRules::build_normalized(gone.iter().map(|p| path(p)), &policy),
            patterns: PatternRules::build(patterns.iter().map(|(p, t)| {
                Box::new(TemplateRule::new(p, t).unwrap()) as Box<dyn PatternRule>
            })),
            target: TargetUrlBuilder::new(Origin::parse("https://new.example").unwrap()),
            policy,
            permanent_code: RedirectCode::PermanentRedirect,
        })
    }

    fn redirect(target: &str) -> ResolveResult {
        ResolveResult::Redirect {
            target: target.into(),
            code: RedirectCode::PermanentRedirect,
        }
    }

    fn resolve(r: &RedirectResolver, url: &str) -> Resolution {
        let (parts, url) = request(url);
        r.resolve_with_stage(&parts, &url)
    }

    #[test]
    fn test_gone_precedes_exact() {
        let r = resolver(
            NormalizationPolicy::default(),
            &[("/old", "/new")],
            &["/old"],
            &[],
        );
        let res = resolve(&r, "https://old.example/old");
        assert_eq!(res.stage, MatchStage::Gone);
        assert_eq!(res.result, ResolveResult::Gone);
    }

    #[test]
    fn test_exact_precedes_pattern() {
        let r = resolver(
            NormalizationPolicy::default(),
            &[("/lab/alpha", "/alpha")],
            &[],
            &[("/lab/:rest*", "/projects/lab/:rest")],
        );
        let res = resolve(&r, "https://old.example/lab/alpha");
        assert_eq!(res.stage, MatchStage::Exact);
        assert_eq!(res.result, redirect("https://new.example/alpha"));
    }

    #[test]
    fn test_first_pattern_wins() {
        let r = resolver(
            NormalizationPolicy::default(),
            &[],
            &[],
            &[("/lab/:rest*", "/first/:rest"), ("/lab/:x", "/second/:x")],
        );
        let res = resolve(&r, "https://old.example/lab/alpha");
        assert_eq!(res.stage, MatchStage::Pattern);
        assert_eq!(res.result, redirect("https://new.example/first/alpha"));
    }

    #[test]
    fn test_query_and_fragment_preserved() {
        let r = resolver(NormalizationPolicy::default(), &[("/posts", "/blog")], &[], &[]);
        let res = resolve(&r, "https://old.example/posts?x=1#top");
        assert_eq!(res.result, redirect("https://new.example/blog?x=1#top"));
    }

    #[test]
    fn test_fallback_keeps_path() {
        let r = resolver(NormalizationPolicy::default(), &[], &[], &[]);
        let res = resolve(&r, "https://old.example/unmapped-path");
        assert_eq!(res.stage, MatchStage::Fallback);
        assert_eq!(res.result, redirect("https://new.example/unmapped-path"));
    }

    #[test]
    fn test_fallback_uses_normalized_path() {
        let policy = NormalizationPolicy {
            lowercase: true,
            trailing_slash: TrailingSlash::Strip,
        };
        let r = resolver(policy, &[], &[], &[]);
        let res = resolve(&r, "https://old.example/Some/Page/?q=A");
        assert_eq!(res.result, redirect("https://new.example/some/page?q=A"));
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let policy = NormalizationPolicy {
            lowercase: true,
            trailing_slash: TrailingSlash::Preserve,
        };
        let r = resolver(policy, &[("/blog", "/articles")], &[], &[]);
        assert_eq!(
            resolve(&r, "https://old.example/Blog").result,
            resolve(&r, "https://old.example/blog").result
        );
    }

    #[test]
    fn test_patterns_match_original_url() {
        let policy = NormalizationPolicy {
            lowercase: true,
            trailing_slash: TrailingSlash::Strip,
        };
        let r = resolver(policy, &[], &[], &[("/Lab/:rest*", "/projects/:rest")]);

        let res = resolve(&r, "https://old.example/Lab/Alpha");
        assert_eq!(res.result, redirect("https://new.example/projects/Alpha"));

        // Folding does not apply before pattern matching.
        let res = resolve(&r, "https://old.example/lab/alpha");
        assert_eq!(res.stage, MatchStage::Fallback);
    }

    #[derive(Debug)]
    struct MethodRule;

    impl PatternRule for MethodRule {
        fn matches(&self, url: &Url) -> Option<Captures> {
            (url.path() == "/api").then(Captures::default)
        }

        fn destination(&self, _captures: &Captures, req: &Parts) -> Pathname {
            path(&format!("/api/{}", req.method.as_str().to_ascii_lowercase()))
        }
    }

    #[test]
    fn test_custom_rule_sees_request() {
        let r = RedirectResolver::new(ResolverDeps {
            policy: NormalizationPolicy::default(),
            target: TargetUrlBuilder::new(Origin::parse("https://new.example").unwrap()),
            exact: ExactRules::default(),
            gone: GoneRules::default(),
            patterns: PatternRules::build([Box::new(MethodRule) as Box<dyn PatternRule>]),
            permanent_code: RedirectCode::TemporaryRedirect,
        });

        let (parts, url) = request("https://old.example/api");
        assert_eq!(
            r.resolve(&parts, &url),
            ResolveResult::Redirect {
                target: "https://new.example/api/get".into(),
                code: RedirectCode::TemporaryRedirect,
            }
        );
    }

    #[test]
    fn test_end_to_end_scenario() {
        let config = RedirectConfig {
            new_origin: "https://new.example".into(),
            lowercase: true,
            trailing_slash: TrailingSlash::Strip,
            exact: vec![ExactRuleConfig {
                from: "/Posts".into(),
                to: "/blog".into(),
            }],
            gone: vec!["/old-image.jpg".into()],
            patterns: vec![PatternRuleConfig {
                pattern: "/lab/:rest*".into(),
                to: "/projects/lab/:rest".into(),
            }],
            ..RedirectConfig::default()
        };
        let r = RedirectResolver::from_config(&config).unwrap();

        assert_eq!(
            resolve(&r, "https://old.example/Posts/?ref=x").result,
            redirect("https://new.example/blog?ref=x")
        );
        assert_eq!(
            resolve(&r, "https://old.example/old-image.jpg").result,
            ResolveResult::Gone
        );
        assert_eq!(
            resolve(&r, "https://old.example/lab/alpha").result,
            redirect("https://new.example/projects/lab/alpha")
        );
        assert_eq!(
            resolve(&r, "https://old.example/random/page").result,
            redirect("https://new.example/random/page")
        );
    }

    #[test]
    fn test_rules_with_spaces_and_non_ascii() {
        let config = RedirectConfig {
            new_origin: "https://new.example".into(),
            lowercase: true,
            exact: vec![ExactRuleConfig {
                from: "/Über uns".into(),
                to: "/about".into(),
            }],
            gone: vec!["/my page.jpg".into()],
            patterns: vec![PatternRuleConfig {
                pattern: "/café/:x".into(),
                to: "/c/:x".into(),
            }],
            ..RedirectConfig::default()
        };
        let r = RedirectResolver::from_config(&config).unwrap();

        let res = resolve(&r, "https://old.example/my%20page.jpg");
        assert_eq!(res.stage, MatchStage::Gone);

        let res = resolve(&r, "https://old.example/%C3%9Cber%20Uns");
        assert_eq!(res.stage, MatchStage::Exact);
        assert_eq!(res.result, redirect("https://new.example/about"));

        let res = resolve(&r, "https://old.example/café/1");
        assert_eq!(res.stage, MatchStage::Pattern);
        assert_eq!(res.result, redirect("https://new.example/c/1"));
    }

    #[test]
    fn test_from_config_rejects_bad_values() {
        let config = RedirectConfig {
            new_origin: "new.example".into(),
            ..RedirectConfig::default()
        };
        assert!(matches!(
            RedirectResolver::from_config(&config),
            Err(RuleError::InvalidOrigin { .. })
        ));

        let config = RedirectConfig {
            new_origin: "https://new.example".into(),
            permanent_code: 200,
            ..RedirectConfig::default()
        };
        assert!(matches!(
            RedirectResolver::from_config(&config),
            Err(RuleError::InvalidRedirectCode(200))
        ));
    }
}

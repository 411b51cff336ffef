//! Path-template matching for pattern rules.
//!
//! # Responsibilities
//! - Compile `/lab/:rest*` style templates at startup
//! - Match the original request path and capture named segments
//! - Render destination templates from captured segments
//!
//! # Design Decisions
//! - Matching is case-sensitive and runs on the percent-encoded path;
//!   templates are encoded the same way when compiled
//! - A destination placeholder must open its segment, so `File:Image`
//!   stays literal
//! - Catch-all parameters (`*`, `+`) may only appear last
//! - No regex: a linear walk over path segments

use std::fmt;

use axum::http::request::Parts;
use url::Url;

use crate::routing::types::{encode_path, Pathname, RuleError};

/// Trait for rules that map a matching request to a destination path.
pub trait PatternRule: Send + Sync + fmt::Debug {
    /// Returns the captured parameters if the request URL matches.
    fn matches(&self, url: &Url) -> Option<Captures>;

    /// Destination pathname for a successful match.
    fn destination(&self, captures: &Captures, req: &Parts) -> Pathname;
}

/// Named values captured by a successful match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captures {
    params: Vec<(String, String)>,
}

impl Captures {
    /// Captured text for `name`, if the parameter matched anything.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    fn insert(&mut self, name: &str, value: String) {
        self.params.push((name.to_owned(), value));
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
    /// Trailing catch-all; `min` is 0 for `*` and 1 for `+`.
    Rest { name: String, min: usize },
}

/// Compiled path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    template: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Compile a template such as `/blog/:year/:slug` or `/lab/:rest*`.
    pub fn parse(template: &str) -> Result<Self, RuleError> {
        let invalid = |reason: String| RuleError::InvalidPattern {
            template: template.to_owned(),
            reason,
        };

        if !template.starts_with('/') {
            return Err(invalid("must start with `/`".into()));
        }
        if template.contains(['?', '#']) {
            return Err(invalid("must not contain `?` or `#`".into()));
        }
        let encoded =
            encode_path(template).ok_or_else(|| invalid("not a valid URL path".into()))?;
        let body = encoded.strip_prefix('/').unwrap_or(encoded.as_str());

        let raw: Vec<&str> = body.split('/').collect();
        let mut segments = Vec::with_capacity(raw.len());
        let mut names: Vec<&str> = Vec::new();

        for (i, part) in raw.iter().enumerate() {
            let segment = match part.strip_prefix(':') {
                None => Segment::Literal((*part).to_owned()),
                Some(param) => {
                    let (name, min) = match param.as_bytes().last() {
                        Some(b'*') => (&param[..param.len() - 1], Some(0)),
                        Some(b'+') => (&param[..param.len() - 1], Some(1)),
                        _ => (param, None),
                    };
                    if !is_param_name(name) {
                        return Err(invalid(format!("invalid parameter name `{name}`")));
                    }
                    if names.contains(&name) {
                        return Err(invalid(format!("duplicate parameter `{name}`")));
                    }
                    names.push(name);

                    match min {
                        Some(_) if i + 1 != raw.len() => {
                            return Err(invalid(format!(
                                "catch-all parameter `{name}` must be the last segment"
                            )));
                        }
                        Some(min) => Segment::Rest {
                            name: name.to_owned(),
                            min,
                        },
                        None => Segment::Param(name.to_owned()),
                    }
                }
            };
            segments.push(segment);
        }

        Ok(Self {
            template: template.to_owned(),
            segments,
        })
    }

    /// Match an absolute path (leading `/` included).
    pub fn match_path(&self, path: &str) -> Option<Captures> {
        let body = path.strip_prefix('/')?;
        let parts: Vec<&str> = body.split('/').collect();
        let mut captures = Captures::default();

        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Literal(lit) => {
                    if parts.get(i) != Some(&lit.as_str()) {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    let value = parts.get(i).filter(|v| !v.is_empty())?;
                    captures.insert(name, (*value).to_owned());
                }
                Segment::Rest { name, min } => {
                    // `/lab/:rest*` also matches `/lab` itself.
                    let rest = parts.get(i..).unwrap_or(&[]);
                    if rest.len() < *min || rest.iter().any(|p| p.is_empty()) {
                        return None;
                    }
                    if !rest.is_empty() {
                        captures.insert(name, rest.join("/"));
                    }
                    return Some(captures);
                }
            }
        }

        (parts.len() == self.segments.len()).then_some(captures)
    }

    /// Names of all parameters declared by the template.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) | Segment::Rest { name, .. } => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Text(String),
    Param(String),
}

/// Destination pathname with `:name` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationTemplate {
    template: String,
    pieces: Vec<Piece>,
}

impl DestinationTemplate {
    /// Compile a destination such as `/projects/lab/:rest`.
    pub fn parse(template: &str) -> Result<Self, RuleError> {
        // Validates the leading `/` and the absence of `?`/`#`.
        let encoded = Pathname::parse(template).map_err(|_| RuleError::InvalidPattern {
            template: template.to_owned(),
            reason: "destination must be a pathname starting with `/`".into(),
        })?;

        let mut pieces = Vec::new();
        let mut text = String::new();
        let mut prev = None;
        let mut chars = encoded.as_str().chars().peekable();

        while let Some(c) = chars.next() {
            let starts_param = c == ':'
                && prev == Some('/')
                && chars
                    .peek()
                    .is_some_and(|next| next.is_ascii_alphanumeric() || *next == '_');
            prev = Some(c);
            if !starts_param {
                text.push(c);
                continue;
            }

            if !text.is_empty() {
                pieces.push(Piece::Text(std::mem::take(&mut text)));
            }
            let mut name = String::new();
            while let Some(&next) = chars.peek() {
                if next.is_ascii_alphanumeric() || next == '_' {
                    name.push(next);
                    prev = Some(next);
                    chars.next();
                } else {
                    break;
                }
            }
            pieces.push(Piece::Param(name));
        }
        if !text.is_empty() {
            pieces.push(Piece::Text(text));
        }

        Ok(Self {
            template: template.to_owned(),
            pieces,
        })
    }

    /// Names of all placeholders in the destination.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.pieces.iter().filter_map(|p| match p {
            Piece::Param(name) => Some(name.as_str()),
            Piece::Text(_) => None,
        })
    }

    /// Substitute captures; placeholders that captured nothing become empty.
    pub fn render(&self, captures: &Captures) -> Pathname {
        let mut out = String::with_capacity(self.template.len());
        for piece in &self.pieces {
            match piece {
                Piece::Text(text) => out.push_str(text),
                Piece::Param(name) => out.push_str(captures.get(name).unwrap_or_default()),
            }
        }
        // The template is an encoded pathname; captures come from a URL
        // path and so carry no raw `?` or `#`.
        Pathname::from_trusted(out)
    }
}

/// Config-driven pattern rule: path template in, destination template out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateRule {
    pattern: PathPattern,
    to: DestinationTemplate,
}

impl TemplateRule {
    /// Compile a rule, rejecting destinations that reference parameters
    /// the pattern never captures.
    pub fn new(pattern: &str, to: &str) -> Result<Self, RuleError> {
        let pattern = PathPattern::parse(pattern)?;
        let to = DestinationTemplate::parse(to)?;

        let declared: Vec<&str> = pattern.param_names().collect();
        if let Some(unknown) = to.param_names().find(|name| !declared.contains(name)) {
            return Err(RuleError::InvalidPattern {
                template: to.template.clone(),
                reason: format!("unknown parameter `{unknown}` (pattern is `{pattern}`)"),
            });
        }

        Ok(Self { pattern, to })
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }
}

impl PatternRule for TemplateRule {
    fn matches(&self, url: &Url) -> Option<Captures> {
        self.pattern.match_path(url.path())
    }

    fn destination(&self, captures: &Captures, _req: &Parts) -> Pathname {
        self.to.render(captures)
    }
}

fn is_param_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

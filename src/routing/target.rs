//! Target URL construction on the new origin.

use url::Url;

use crate::routing::types::{Origin, Pathname};

/// Optional query and fragment carried over from the original request.
///
/// Both are given without their leading `?` / `#`, the way
/// [`Url::query`] and [`Url::fragment`] return them. Empty values are
/// treated as absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TargetParts<'a> {
    pub search: Option<&'a str>,
    pub hash: Option<&'a str>,
}

impl<'a> TargetParts<'a> {
    /// Query and fragment of `url`.
    pub fn from_url(url: &'a Url) -> Self {
        Self {
            search: url.query(),
            hash: url.fragment(),
        }
    }
}

/// Build an absolute URL from `origin` and `pathname`.
///
/// The path is set on a copy of the origin URL rather than joined as a
/// relative reference, so a pathname such as `//host` can never switch
/// the authority.
pub fn build_target_url(origin: &Origin, pathname: &Pathname, parts: TargetParts<'_>) -> String {
    let mut url = origin.as_url().clone();
    url.set_path(pathname.as_str());
    if let Some(search) = parts.search.filter(|s| !s.is_empty()) {
        url.set_query(Some(search));
    }
    if let Some(hash) = parts.hash.filter(|h| !h.is_empty()) {
        url.set_fragment(Some(hash));
    }
    url.into()
}

/// Target URL builder with a fixed origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetUrlBuilder {
    origin: Origin,
}

impl TargetUrlBuilder {
    pub fn new(origin: Origin) -> Self {
        Self { origin }
    }

    pub fn build(&self, pathname: &Pathname, parts: TargetParts<'_>) -> String {
        build_target_url(&self.origin, pathname, parts)
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }
}

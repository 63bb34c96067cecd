//! Reserved path matching.
//!
//! # Responsibilities
//! - Match configured passthrough prefixes (case-sensitive)
//! - Recognize the two well-known crawl documents by exact path
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - No regex to guarantee O(n) matching
//! - Well-known documents are always reserved, whatever the prefix list says

use crate::config::RoutingConfig;

/// A crawl document served from the store for every visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WellKnownDocument {
    /// Exact request path, also the store key.
    pub path: &'static str,
    /// `content-type` used when serving it from the store.
    pub content_type: &'static str,
}

pub const ROBOTS_TXT: WellKnownDocument = WellKnownDocument {
    path: "/robots.txt",
    content_type: "text/plain; charset=utf-8",
};

pub const SITEMAP_XML: WellKnownDocument = WellKnownDocument {
    path: "/sitemap.xml",
    content_type: "application/xml",
};

const WELL_KNOWN: [WellKnownDocument; 2] = [ROBOTS_TXT, SITEMAP_XML];

/// Look up a well-known document by exact path.
pub fn well_known_document(path: &str) -> Option<WellKnownDocument> {
    WELL_KNOWN.iter().copied().find(|doc| doc.path == path)
}

/// Matches the request path prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }
}

/// Paths that skip crawler detection and go straight to the upstream.
#[derive(Debug, Clone)]
pub struct ReservedPaths {
    prefixes: Vec<PathPrefixMatcher>,
}

impl ReservedPaths {
    pub fn from_config(config: &RoutingConfig) -> Self {
        Self {
            prefixes: config
                .passthrough_prefixes
                .iter()
                .map(PathPrefixMatcher::new)
                .collect(),
        }
    }

    /// True for any passthrough prefix or well-known document.
    pub fn is_reserved(&self, path: &str) -> bool {
        well_known_document(path).is_some() || self.prefixes.iter().any(|m| m.matches(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_matcher() {
        let matcher = PathPrefixMatcher::new("/_next");
        assert!(matcher.matches("/_next/static/chunk.js"));
        assert!(matcher.matches("/_next"));
        assert!(!matcher.matches("/pricing"));
        assert!(!matcher.matches("/_NEXT/static"));
    }

    #[test]
    fn test_default_reserved_paths() {
        let reserved = ReservedPaths::from_config(&RoutingConfig::default());
        assert!(reserved.is_reserved("/_next/image?url=x"));
        assert!(reserved.is_reserved("/favicon.ico"));
        assert!(reserved.is_reserved("/robots.txt"));
        assert!(reserved.is_reserved("/sitemap.xml"));
        assert!(!reserved.is_reserved("/"));
        assert!(!reserved.is_reserved("/pricing"));
    }

    #[test]
    fn test_well_known_documents_always_reserved() {
        let reserved = ReservedPaths::from_config(&RoutingConfig {
            passthrough_prefixes: vec![],
        });
        assert!(reserved.is_reserved("/robots.txt"));
        assert!(reserved.is_reserved("/sitemap.xml"));
        assert!(!reserved.is_reserved("/favicon.ico"));
    }

    #[test]
    fn test_well_known_lookup_is_exact() {
        assert_eq!(well_known_document("/robots.txt"), Some(ROBOTS_TXT));
        assert_eq!(well_known_document("/sitemap.xml"), Some(SITEMAP_XML));
        assert_eq!(well_known_document("/robots.txt/"), None);
        assert_eq!(well_known_document("/sitemap.xml.gz"), None);
    }
}

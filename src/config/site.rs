//! Resolved site configuration shared by every request.

use url::Url;

use crate::config::schema::SiteSettings;
use crate::config::validation::{check_distinct_hosts, parse_origin, ValidationError};

/// The upstream/canonical origin pair plus the debug flag.
///
/// Built once at startup and passed by reference through classification,
/// proxying and rewriting. Nothing in the request path reads origins from
/// anywhere else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    upstream: Url,
    canonical: Url,
    debug: bool,
}

impl SiteConfig {
    /// Create a site config from already-parsed origins.
    pub fn new(upstream: Url, canonical: Url, debug: bool) -> Result<Self, ValidationError> {
        check_distinct_hosts(&upstream, &canonical)?;
        Ok(Self {
            upstream,
            canonical,
            debug,
        })
    }

    /// Parse and check the `[site]` section.
    pub fn from_settings(settings: &SiteSettings) -> Result<Self, Vec<ValidationError>> {
        let upstream = parse_origin("site.upstream_origin", &settings.upstream_origin);
        let canonical = parse_origin("site.canonical_origin", &settings.canonical_origin);
        match (upstream, canonical) {
            (Ok(u), Ok(c)) => Self::new(u, c, settings.debug).map_err(|e| vec![e]),
            (u, c) => Err(u.err().into_iter().chain(c.err()).collect()),
        }
    }

    pub fn upstream(&self) -> &Url {
        &self.upstream
    }

    pub fn canonical(&self) -> &Url {
        &self.canonical
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    /// `scheme://host[:port]` of the upstream.
    pub fn upstream_origin(&self) -> String {
        self.upstream.origin().ascii_serialization()
    }

    /// `scheme://host[:port]` of the canonical site.
    pub fn canonical_origin(&self) -> String {
        self.canonical.origin().ascii_serialization()
    }

    /// `host[:port]` of the upstream, as it appears after `//`.
    pub fn upstream_authority(&self) -> String {
        authority(&self.upstream)
    }

    /// `host[:port]` of the canonical site.
    pub fn canonical_authority(&self) -> String {
        authority(&self.canonical)
    }
}

fn authority(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}

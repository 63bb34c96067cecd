//! Upstream → canonical host rewriting.
//!
//! # Responsibilities
//! - Replace absolute upstream URLs (`http(s)://upstream`) with the canonical origin
//! - Replace protocol-relative `//upstream` with `//canonical`
//! - Apply the same substitution to redirect `Location` values
//!
//! # Design Decisions
//! - Textual substitution, no HTML parsing: malformed markup is fine
//! - Case-insensitive on scheme and host
//! - An occurrence followed by another host character (`a-z0-9.-`) names a
//!   different host and is left alone
//! - Idempotent because the output never contains the upstream authority
//!   at a match position

use std::borrow::Cow;

use regex::Regex;

use crate::config::SiteConfig;

/// Rewrites references to the upstream origin, compiled once per process.
#[derive(Debug, Clone)]
pub struct HostRewriter {
    pattern: Regex,
    canonical_origin: String,
    canonical_authority: String,
}

impl HostRewriter {
    pub fn new(site: &SiteConfig) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(
            "(?i)(?:https?:)?//{}",
            regex::escape(&site.upstream_authority())
        ))?;

        Ok(Self {
            pattern,
            canonical_origin: site.canonical_origin(),
            canonical_authority: site.canonical_authority(),
        })
    }

    /// Rewrite every upstream reference in an HTML payload.
    pub fn rewrite_body<'a>(&self, html: &'a str) -> Cow<'a, str> {
        let mut out = String::new();
        let mut copied = 0;

        for m in self.pattern.find_iter(html) {
            let continues_host = html[m.end()..]
                .chars()
                .next()
                .is_some_and(is_host_char);
            if continues_host {
                continue;
            }

            if out.is_empty() {
                out.reserve(html.len());
            }
            out.push_str(&html[copied..m.start()]);
            if m.as_str().starts_with("//") {
                out.push_str("//");
                out.push_str(&self.canonical_authority);
            } else {
                out.push_str(&self.canonical_origin);
            }
            copied = m.end();
        }

        if copied == 0 {
            return Cow::Borrowed(html);
        }
        out.push_str(&html[copied..]);
        Cow::Owned(out)
    }

    /// Rewrite a redirect target. Relative locations come back unchanged.
    pub fn rewrite_location<'a>(&self, location: &'a str) -> Cow<'a, str> {
        self.rewrite_body(location)
    }
}

fn is_host_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '.' || c == '-'
}

/// Whether a `content-type` value denotes HTML.
pub fn is_html(content_type: &str) -> bool {
    content_type.to_ascii_lowercase().contains("text/html")
}

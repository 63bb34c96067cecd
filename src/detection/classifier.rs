//! Crawler classification by `User-Agent`.

use axum::http::{header, HeaderMap};
use regex::{Regex, RegexBuilder};

use crate::detection::signatures::BOT_SIGNATURES;

/// Decides whether a client is an automated crawler.
///
/// Immutable after construction; clone it or share it through an `Arc`.
#[derive(Debug, Clone)]
pub struct CrawlerClassifier {
    /// `None` when built from an empty list: nothing is a bot.
    pattern: Option<Regex>,
}

impl CrawlerClassifier {
    /// Compile a classifier from literal signatures.
    pub fn new<I, S>(signatures: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let alternation = signatures
            .into_iter()
            .map(|s| regex::escape(s.as_ref()))
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("|");

        if alternation.is_empty() {
            return Ok(Self { pattern: None });
        }

        let pattern = RegexBuilder::new(&alternation)
            .case_insensitive(true)
            .build()?;
        Ok(Self {
            pattern: Some(pattern),
        })
    }

    /// Classifier over the built-in [`BOT_SIGNATURES`] list.
    pub fn with_builtin_signatures() -> Result<Self, regex::Error> {
        Self::new(BOT_SIGNATURES.iter().copied())
    }

    /// True if the identity string contains any signature.
    pub fn is_bot(&self, identity: Option<&str>) -> bool {
        match (&self.pattern, identity) {
            (Some(pattern), Some(ua)) => pattern.is_match(ua),
            _ => false,
        }
    }

    /// Classify a request from its `User-Agent` header.
    pub fn classify(&self, headers: &HeaderMap) -> bool {
        let ua = headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok());
        self.is_bot(ua)
    }
}

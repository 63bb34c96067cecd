//! Bounded, failure-tolerant snapshot lookup.
//!
//! # Responsibilities
//! - Put a deadline on every store call
//! - Apply the optional freshness policy
//! - Turn misses, empty documents, errors, timeouts and stale documents into "absent"
//! - Log and count each outcome

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use crate::observability::metrics;
use crate::store::{CachedDocument, SnapshotStore};

/// Result of one lookup, before it is collapsed to `Option`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupOutcome {
    Hit,
    Miss,
    Stale,
    Error,
    Timeout,
}

impl LookupOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            LookupOutcome::Hit => "hit",
            LookupOutcome::Miss => "miss",
            LookupOutcome::Stale => "stale",
            LookupOutcome::Error => "error",
            LookupOutcome::Timeout => "timeout",
        }
    }
}

/// Store access as the router sees it.
#[derive(Debug, Clone)]
pub struct SnapshotLookup {
    store: Arc<dyn SnapshotStore>,
    timeout: Duration,
    max_staleness: Option<Duration>,
}

impl SnapshotLookup {
    pub fn new(store: Arc<dyn SnapshotStore>, timeout: Duration, max_staleness: Option<Duration>) -> Self {
        Self {
            store,
            timeout,
            max_staleness,
        }
    }

    /// Look up `key`, returning the document only on a fresh hit.
    pub async fn fetch(&self, key: &str) -> Option<CachedDocument> {
        let (outcome, document) = self.fetch_with_outcome(key).await;
        metrics::record_cache_lookup(outcome.as_str());
        document
    }

    /// Look up `key` and report how the lookup resolved.
    pub async fn fetch_with_outcome(&self, key: &str) -> (LookupOutcome, Option<CachedDocument>) {
        let document = match tokio::time::timeout(self.timeout, self.store.get(key)).await {
            Ok(Ok(Some(document))) if document.body.is_empty() => {
                tracing::debug!(key = %key, store = self.store.name(), "Snapshot is empty, treating as miss");
                return (LookupOutcome::Miss, None);
            }
            Ok(Ok(Some(document))) => document,
            Ok(Ok(None)) => {
                tracing::debug!(key = %key, store = self.store.name(), "Snapshot miss");
                return (LookupOutcome::Miss, None);
            }
            Ok(Err(e)) => {
                tracing::warn!(key = %key, store = self.store.name(), error = %e, "Snapshot lookup failed");
                return (LookupOutcome::Error, None);
            }
            Err(_) => {
                tracing::warn!(
                    key = %key,
                    store = self.store.name(),
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Snapshot lookup timed out"
                );
                return (LookupOutcome::Timeout, None);
            }
        };

        if let (Some(limit), Some(age)) = (self.max_staleness, document.age(SystemTime::now())) {
            if age > limit {
                tracing::info!(key = %key, age_secs = age.as_secs(), "Snapshot is stale, ignoring");
                return (LookupOutcome::Stale, None);
            }
        }

        (LookupOutcome::Hit, Some(document))
    }
}

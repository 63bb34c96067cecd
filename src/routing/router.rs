//! Per-request routing decision and dispatch.
//!
//! # Responsibilities
//! - Short-circuit reserved paths (well-known documents are cache-first)
//! - Classify the client
//! - Serve crawler snapshots from the store
//! - Fall back to the live upstream for humans and snapshot misses
//!
//! # Design Decisions
//! - Steps run strictly in order, no backtracking
//! - Every branch ends in exactly one response
//! - Immutable after construction (thread-safe without locks)

use std::sync::Arc;

use axum::http::{HeaderMap, Method, Uri};
use axum::response::Response;

use crate::config::{ProxyConfig, SiteConfig};
use crate::detection::CrawlerClassifier;
use crate::http::response::{self, ServedBy};
use crate::observability::metrics;
use crate::proxy::UpstreamProxy;
use crate::routing::cache_key::cache_key;
use crate::routing::matcher::{well_known_document, ReservedPaths, WellKnownDocument};
use crate::store::{CachedDocument, SnapshotLookup};

/// What the router chose to do with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Serve a stored document.
    ServeCachedDocument {
        document: CachedDocument,
        /// `Some` for robots.txt / sitemap.xml, `None` for crawler snapshots.
        well_known: Option<WellKnownDocument>,
    },
    /// Fetch live from the upstream after classification.
    ProxyToUpstream { bot: bool },
    /// Reserved path: fetch live without classification.
    ProxyPassthroughInfrastructure,
}

/// A response plus how it was produced.
#[derive(Debug)]
pub struct Routed {
    pub response: Response,
    pub served_by: ServedBy,
}

/// The request decision engine.
#[derive(Debug, Clone)]
pub struct EdgeRouter {
    site: Arc<SiteConfig>,
    classifier: Arc<CrawlerClassifier>,
    reserved: ReservedPaths,
    lookup: SnapshotLookup,
    upstream: UpstreamProxy,
    max_age_secs: u64,
}

impl EdgeRouter {
    pub fn new(
        config: &ProxyConfig,
        site: Arc<SiteConfig>,
        classifier: Arc<CrawlerClassifier>,
        lookup: SnapshotLookup,
        upstream: UpstreamProxy,
    ) -> Self {
        Self {
            site,
            classifier,
            reserved: ReservedPaths::from_config(&config.routing),
            lookup,
            upstream,
            max_age_secs: config.cache.max_age_secs,
        }
    }

    /// Decide how to answer a request for `path`.
    pub async fn decide(&self, path: &str, headers: &HeaderMap) -> RouteDecision {
        // 1. Reserved paths
        if self.reserved.is_reserved(path) {
            if let Some(kind) = well_known_document(path) {
                if let Some(document) = self.lookup.fetch(kind.path).await {
                    return RouteDecision::ServeCachedDocument {
                        document,
                        well_known: Some(kind),
                    };
                }
            }
            return RouteDecision::ProxyPassthroughInfrastructure;
        }

        // 2. Classification
        let bot = self.classifier.classify(headers);
        metrics::record_classification(bot);

        // 3. Crawler snapshot
        if bot {
            let key = cache_key(path);
            if let Some(document) = self.lookup.fetch(&key).await {
                return RouteDecision::ServeCachedDocument {
                    document,
                    well_known: None,
                };
            }
            tracing::info!(path = %path, key = %key, "No snapshot for crawler, falling back to upstream");
        }

        // 4. Live fallback
        RouteDecision::ProxyToUpstream { bot }
    }

    /// Decide and produce the response.
    pub async fn handle(&self, method: &Method, uri: &Uri, headers: &HeaderMap) -> Routed {
        match self.decide(uri.path(), headers).await {
            RouteDecision::ServeCachedDocument {
                document,
                well_known: Some(kind),
            } => Routed {
                response: response::well_known(document, kind),
                served_by: ServedBy::InfrastructureCache,
            },
            RouteDecision::ServeCachedDocument {
                document,
                well_known: None,
            } => {
                let mut response = response::snapshot(document, self.max_age_secs);
                if self.site.debug() {
                    response::apply_debug_headers(&mut response, ServedBy::Cache, true);
                }
                Routed {
                    response,
                    served_by: ServedBy::Cache,
                }
            }
            RouteDecision::ProxyPassthroughInfrastructure => Routed {
                response: self.upstream.forward(method, uri, headers).await,
                served_by: ServedBy::InfrastructureProxy,
            },
            RouteDecision::ProxyToUpstream { bot } => {
                let mut response = self.upstream.forward(method, uri, headers).await;
                if self.site.debug() {
                    response::apply_debug_headers(&mut response, ServedBy::Proxy, bot);
                }
                Routed {
                    response,
                    served_by: ServedBy::Proxy,
                }
            }
        }
    }
}

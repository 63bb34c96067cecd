//! Startup orchestration.
//!
//! # Responsibilities
//! - Resolve the site configuration from validated settings
//! - Compile the crawler matcher and the host rewriter
//! - Open the snapshot store and build the upstream client
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - Everything built here is immutable and shared via Arc

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::config::validation::validate_config;
use crate::config::{ConfigError, ProxyConfig, SiteConfig};
use crate::detection::CrawlerClassifier;
use crate::proxy::{HostRewriter, UpstreamError, UpstreamProxy};
use crate::routing::EdgeRouter;
use crate::store::{open_store, SnapshotLookup, SnapshotStore, StoreError};

/// Anything that prevents the proxy from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to compile matcher: {0}")]
    Pattern(#[from] regex::Error),

    #[error("snapshot store: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Build the router with the store named in configuration.
pub fn build_router(config: &ProxyConfig) -> Result<EdgeRouter, StartupError> {
    let store = open_store(&config.store)?;
    build_router_with_store(config, store)
}

/// Build the router around an already-open store.
pub fn build_router_with_store(
    config: &ProxyConfig,
    store: Arc<dyn SnapshotStore>,
) -> Result<EdgeRouter, StartupError> {
    validate_config(config).map_err(ConfigError::Validation)?;
    let site = SiteConfig::from_settings(&config.site).map_err(ConfigError::Validation)?;
    let site = Arc::new(site);

    let classifier = Arc::new(CrawlerClassifier::with_builtin_signatures()?);
    let rewriter = Arc::new(HostRewriter::new(&site)?);
    let upstream = UpstreamProxy::new(site.clone(), rewriter, &config.timeouts)?;

    let lookup = SnapshotLookup::new(
        store.clone(),
        Duration::from_millis(config.timeouts.store_lookup_ms),
        config.cache.max_staleness_secs.map(Duration::from_secs),
    );

    tracing::info!(
        upstream = %site.upstream_origin(),
        canonical = %site.canonical_origin(),
        debug = site.debug(),
        store = store.name(),
        "Router initialized"
    );

    Ok(EdgeRouter::new(config, site, classifier, lookup, upstream))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_builds_from_defaults() {
        assert!(build_router(&ProxyConfig::default()).is_ok());
    }

    #[test]
    fn test_invalid_config_is_fatal() {
        let mut config = ProxyConfig::default();
        config.site.canonical_origin = config.site.upstream_origin.clone();

        let err = build_router_with_store(&config, Arc::new(MemoryStore::new())).unwrap_err();
        assert!(matches!(err, StartupError::Config(ConfigError::Validation(_))));
    }
}

//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the prerender proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Upstream and canonical origins.
    pub site: SiteSettings,

    /// Reserved path handling.
    pub routing: RoutingConfig,

    /// Freshness of served snapshots.
    pub cache: CacheConfig,

    /// Snapshot store backend.
    pub store: StoreConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Origins the proxy sits between.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteSettings {
    /// Internal rendering origin that serves live pages.
    pub upstream_origin: String,

    /// Public origin that crawlers and visitors should see.
    pub canonical_origin: String,

    /// Attach `x-served-by` / `x-bot-detected` headers.
    pub debug: bool,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            upstream_origin: "https://web.example.com".to_string(),
            canonical_origin: "https://example.com".to_string(),
            debug: false,
        }
    }
}

/// Reserved path configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Path prefixes that bypass crawler detection entirely.
    pub passthrough_prefixes: Vec<String>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            passthrough_prefixes: vec![
                "/_next".to_string(),
                "/favicon.ico".to_string(),
                "/robots.txt".to_string(),
                "/sitemap.xml".to_string(),
            ],
        }
    }
}

/// Snapshot freshness configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// `max-age` advertised on snapshot responses, in seconds.
    pub max_age_secs: u64,

    /// Snapshots generated longer ago than this are ignored. Unset = never stale.
    pub max_staleness_secs: Option<u64>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_age_secs: 3600,
            max_staleness_secs: None,
        }
    }
}

/// Which store backend holds the snapshots.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// In-process map, optionally seeded from a JSON manifest.
    #[default]
    Memory,
    /// Output directory of the offline snapshot pipeline.
    Directory,
}

/// Snapshot store configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct StoreConfig {
    /// Backend kind.
    pub kind: StoreKind,

    /// Manifest file (memory) or root directory (directory).
    pub path: Option<String>,
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upstream connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Deadline for the whole upstream fetch (headers plus HTML body) in seconds.
    /// Also the longest a streamed body may stall between chunks.
    pub upstream_secs: u64,

    /// Deadline for a single snapshot store lookup in milliseconds.
    pub store_lookup_ms: u64,

    /// Outer request timeout in seconds. Must exceed `upstream_secs` plus
    /// `store_lookup_ms`.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            upstream_secs: 15,
            store_lookup_ms: 500,
            request_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

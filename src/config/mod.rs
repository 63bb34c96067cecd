//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! optional config file (TOML, path from PRERENDER_PROXY_CONFIG)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (UPSTREAM_ORIGIN / CANONICAL_ORIGIN / DEBUG overrides)
//!     → validation.rs (semantic checks, all errors at once)
//!     → site.rs (SiteConfig with parsed origins)
//!     → shared via Arc to every request
//! ```
//!
//! # Design Decisions
//! - Config is resolved once per process and never mutated afterwards
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Invalid configuration is fatal before the listener binds

pub mod loader;
pub mod schema;
pub mod site;
pub mod validation;

pub use loader::{resolve_config, ConfigError};
pub use schema::{
    CacheConfig, ListenerConfig, ObservabilityConfig, ProxyConfig, RoutingConfig, SiteSettings,
    StoreConfig, StoreKind, TimeoutConfig, TlsConfig,
};
pub use site::SiteConfig;
pub use validation::ValidationError;

//! Prerender proxy library.
//!
//! Crawlers get stored snapshots, humans get the live upstream with its
//! host rewritten to the canonical origin.

pub mod config;
pub mod detection;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod routing;
pub mod store;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;

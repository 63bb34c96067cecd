//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path, User-Agent)
//!     → matcher.rs (reserved prefixes, well-known documents)
//!     → detection (crawler or not)
//!     → cache_key.rs (normalized snapshot key)
//!     → router.rs (RouteDecision → response)
//! ```
//!
//! # Design Decisions
//! - Reserved paths compiled at startup, immutable at runtime
//! - No regex in path matching (prefix and exact matching only)
//! - Deterministic: same path and User-Agent always take the same branch
//! - A crawler without a snapshot gets the live page, never an error

pub mod cache_key;
pub mod matcher;
pub mod router;

pub use cache_key::{cache_key, ROOT_KEY};
pub use router::{EdgeRouter, RouteDecision, Routed};

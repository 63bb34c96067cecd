//! Upstream proxying subsystem.
//!
//! # Data Flow
//! ```text
//! inbound method, path, query, headers
//!     → headers.rs (allow-list)
//!     → upstream.rs (reqwest, no redirect following, deadline)
//!     → 3xx: rewrite.rs on Location
//!     → text/html: rewrite.rs on body
//!     → anything else: streamed through
//! ```

pub mod headers;
pub mod rewrite;
pub mod upstream;

pub use rewrite::HostRewriter;
pub use upstream::{UpstreamError, UpstreamProxy};

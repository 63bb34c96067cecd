//! Crawler detection subsystem.
//!
//! # Data Flow
//! ```text
//! User-Agent header (optional)
//!     → classifier.rs (one compiled, case-insensitive alternation)
//!     → bool: automated client or not
//!
//! Compilation (at startup):
//!     signatures.rs (static list)
//!     → escape + join with `|`
//!     → Regex, shared via Arc
//! ```
//!
//! # Design Decisions
//! - Signature list is static policy input, not learned or reloaded
//! - Substring match, so version suffixes and wrappers still match
//! - Absent or non-UTF-8 identity is a human visitor

pub mod classifier;
pub mod signatures;

pub use classifier::CrawlerClassifier;
pub use signatures::BOT_SIGNATURES;

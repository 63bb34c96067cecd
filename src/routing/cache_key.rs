//! Cache key derivation shared with the offline snapshot pipeline.
//!
//! The key depends on the path only. Query strings and headers never take
//! part, so `/pricing`, `/pricing/` and `/pricing?ref=x` share a snapshot.

/// Key of the site root.
pub const ROOT_KEY: &str = "/index";

/// Normalize a request path into a snapshot key.
pub fn cache_key(path: &str) -> String {
    match path.trim_end_matches('/') {
        "" => ROOT_KEY.to_string(),
        trimmed => trimmed.to_string(),
    }
}

//! Response construction for locally served documents and failures.
//!
//! # Responsibilities
//! - Snapshot responses for crawlers (HTML, cache-friendly)
//! - Well-known document responses (robots.txt, sitemap.xml)
//! - Synthetic 502 for upstream failures
//! - Debug headers describing how a response was produced

use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::routing::matcher::WellKnownDocument;
use crate::store::CachedDocument;

pub const X_SERVED_BY: HeaderName = HeaderName::from_static("x-served-by");
pub const X_BOT_DETECTED: HeaderName = HeaderName::from_static("x-bot-detected");

/// Body of the synthetic 502.
pub const BAD_GATEWAY_BODY: &str = "Error loading page";

/// Which path produced a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServedBy {
    /// Crawler snapshot from the store.
    Cache,
    /// Live upstream fetch after classification.
    Proxy,
    /// robots.txt / sitemap.xml from the store.
    InfrastructureCache,
    /// Reserved path proxied without classification.
    InfrastructureProxy,
}

impl ServedBy {
    /// Metrics label.
    pub fn as_str(&self) -> &'static str {
        match self {
            ServedBy::Cache => "prerender-cache",
            ServedBy::Proxy => "upstream-proxy",
            ServedBy::InfrastructureCache => "infrastructure-cache",
            ServedBy::InfrastructureProxy => "infrastructure-proxy",
        }
    }
}

/// 200 response carrying a crawler snapshot.
pub fn snapshot(document: CachedDocument, max_age_secs: u64) -> Response {
    let cache_control = format!("public, max-age={}", max_age_secs);
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8".to_string()),
            (header::CACHE_CONTROL, cache_control),
        ],
        document.body,
    )
        .into_response()
}

/// 200 response carrying robots.txt or sitemap.xml.
pub fn well_known(document: CachedDocument, kind: WellKnownDocument) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, kind.content_type)],
        document.body,
    )
        .into_response()
}

/// Plain-text 502 returned when the upstream cannot be reached.
pub fn bad_gateway() -> Response {
    (
        StatusCode::BAD_GATEWAY,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        BAD_GATEWAY_BODY,
    )
        .into_response()
}

/// Attach `x-served-by` and `x-bot-detected`.
pub fn apply_debug_headers(response: &mut Response, served_by: ServedBy, bot: bool) {
    let headers = response.headers_mut();
    headers.insert(X_SERVED_BY, HeaderValue::from_static(served_by.as_str()));
    headers.insert(
        X_BOT_DETECTED,
        HeaderValue::from_static(if bot { "true" } else { "false" }),
    );
}

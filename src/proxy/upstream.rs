//! Live forwarding to the rendering origin.
//!
//! # Responsibilities
//! - Build the upstream URL from the inbound path and query
//! - Forward allow-listed headers only
//! - Intercept redirects and rewrite their `Location`
//! - Rewrite HTML bodies, stream everything else untouched
//! - Map transport failures and timeouts to 502
//!
//! # Design Decisions
//! - Redirects are never followed (reqwest `Policy::none()`)
//! - The inbound body is not forwarded; the upstream only renders pages
//! - No retries: a failed fetch is a 502 immediately
//! - One deadline covers response headers and the HTML body together
//! - Streamed bodies end once the upstream stalls for longer than that deadline
//! - HTML still carrying a `content-encoding` after decoding is relayed as-is

use std::io;
use std::sync::Arc;
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri};
use axum::response::Response;
use futures_util::stream::{self, Stream, StreamExt};
use reqwest::redirect::Policy;
use thiserror::Error;
use tokio::time::{timeout, timeout_at, Instant};
use url::Url;

use crate::config::{SiteConfig, TimeoutConfig};
use crate::http::response::bad_gateway;
use crate::observability::metrics;
use crate::proxy::headers::{forwardable_headers, relayable_headers};
use crate::proxy::rewrite::{is_html, HostRewriter};

/// `content-type` of rewritten HTML responses.
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Errors while talking to the upstream.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("failed to build upstream client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("upstream request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("upstream did not respond within {0:?}")]
    Timeout(Duration),

    #[error("failed to read upstream body: {0}")]
    Body(#[source] reqwest::Error),
}

impl UpstreamError {
    fn kind(&self) -> &'static str {
        match self {
            UpstreamError::Client(_) | UpstreamError::Transport(_) => "transport",
            UpstreamError::Timeout(_) => "timeout",
            UpstreamError::Body(_) => "body",
        }
    }
}

/// Forwards requests to the upstream origin.
#[derive(Debug, Clone)]
pub struct UpstreamProxy {
    client: reqwest::Client,
    site: Arc<SiteConfig>,
    rewriter: Arc<HostRewriter>,
    timeout: Duration,
}

impl UpstreamProxy {
    pub fn new(
        site: Arc<SiteConfig>,
        rewriter: Arc<HostRewriter>,
        timeouts: &TimeoutConfig,
    ) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .redirect(Policy::none())
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .no_proxy()
            .build()
            .map_err(UpstreamError::Client)?;

        Ok(Self {
            client,
            site,
            rewriter,
            timeout: Duration::from_secs(timeouts.upstream_secs),
        })
    }

    /// Resolve the inbound path and query against the upstream origin.
    ///
    /// The path is set verbatim, so `//other.host/x` stays on the upstream.
    pub fn target_url(&self, uri: &Uri) -> Url {
        let mut url = self.site.upstream().clone();
        url.set_path(uri.path());
        url.set_query(uri.query());
        url.set_fragment(None);
        url
    }

    /// Forward a request; always yields a response (502 on failure).
    pub async fn forward(&self, method: &Method, uri: &Uri, headers: &HeaderMap) -> Response {
        match self.try_forward(method, uri, headers).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(path = %uri.path(), error = %e, "Upstream fetch failed");
                metrics::record_upstream_error(e.kind());
                bad_gateway()
            }
        }
    }

    async fn try_forward(
        &self,
        method: &Method,
        uri: &Uri,
        headers: &HeaderMap,
    ) -> Result<Response, UpstreamError> {
        let url = self.target_url(uri);
        tracing::debug!(method = %method, url = %url, "Forwarding to upstream");

        let request = self
            .client
            .request(method.clone(), url)
            .headers(forwardable_headers(headers));

        let deadline = Instant::now() + self.timeout;
        let upstream = timeout_at(deadline, request.send())
            .await
            .map_err(|_| UpstreamError::Timeout(self.timeout))?
            .map_err(UpstreamError::Transport)?;

        let status = upstream.status();

        if status.is_redirection() {
            if let Some(location) = upstream.headers().get(header::LOCATION) {
                return Ok(self.redirect(status, location));
            }
        }

        let content_type = upstream
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        if !is_html(content_type) {
            return Ok(self.stream_through(status, upstream));
        }

        // reqwest drops `content-encoding` for every coding it decoded.
        if let Some(encoding) = still_encoded(upstream.headers()) {
            tracing::warn!(
                url = %upstream.url(),
                content_encoding = %encoding,
                "HTML is still encoded, relaying without rewrite"
            );
            return Ok(self.stream_through(status, upstream));
        }

        let mut headers = relayable_headers(upstream.headers());
        let html = timeout_at(deadline, upstream.text())
            .await
            .map_err(|_| UpstreamError::Timeout(self.timeout))?
            .map_err(UpstreamError::Body)?;

        let body = self.rewriter.rewrite_body(&html).into_owned();
        headers.remove(header::CONTENT_LENGTH);
        headers.remove(header::CONTENT_ENCODING);
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(HTML_CONTENT_TYPE));
        Ok(build_response(status, headers, Body::from(body)))
    }

    /// Relay status, headers and body untouched, minus hop-by-hop headers.
    fn stream_through(&self, status: StatusCode, upstream: reqwest::Response) -> Response {
        let headers = relayable_headers(upstream.headers());
        let body = Body::from_stream(idle_bounded(upstream.bytes_stream(), self.timeout));
        build_response(status, headers, body)
    }

    /// Re-emit a 3xx with only the rewritten `Location` and no body.
    fn redirect(&self, status: StatusCode, location: &HeaderValue) -> Response {
        let location = location
            .to_str()
            .ok()
            .and_then(|l| HeaderValue::from_str(&self.rewriter.rewrite_location(l)).ok())
            .unwrap_or_else(|| location.clone());

        let mut headers = HeaderMap::new();
        headers.insert(header::LOCATION, location);
        build_response(status, headers, Body::empty())
    }
}

/// A `content-encoding` other than `identity` left on an upstream response.
fn still_encoded(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::CONTENT_ENCODING)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::trim)
        .find(|v| !v.eq_ignore_ascii_case("identity"))
        .map(str::to_string)
}

/// End a body stream with an error once no chunk arrives within `idle`.
fn idle_bounded<S>(chunks: S, idle: Duration) -> impl Stream<Item = Result<Bytes, io::Error>> + Send + 'static
where
    S: Stream<Item = reqwest::Result<Bytes>> + Send + 'static,
{
    stream::unfold(Some(Box::pin(chunks)), move |state| async move {
        let mut chunks = state?;
        match timeout(idle, chunks.next()).await {
            Ok(Some(Ok(chunk))) => Some((Ok(chunk), Some(chunks))),
            Ok(Some(Err(e))) => Some((Err(io::Error::other(e)), None)),
            Ok(None) => None,
            Err(_) => {
                tracing::warn!(idle_ms = idle.as_millis() as u64, "Upstream body stalled, closing stream");
                metrics::record_upstream_error("stalled");
                Some((Err(io::Error::new(io::ErrorKind::TimedOut, "upstream body stalled")), None))
            }
        }
    })
}

fn build_response(status: StatusCode, headers: HeaderMap, body: Body) -> Response {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proxy() -> UpstreamProxy {
        let site = Arc::new(
            SiteConfig::new(
                Url::parse("https://web.example.com/ignored/base").unwrap(),
                Url::parse("https://example.com").unwrap(),
                false,
            )
            .unwrap(),
        );
        let rewriter = Arc::new(HostRewriter::new(&site).unwrap());
        UpstreamProxy::new(site, rewriter, &TimeoutConfig::default()).unwrap()
    }

    #[test]
    fn test_target_url_keeps_path_and_query() {
        let p = proxy();
        let uri: Uri = "/pricing?plan=pro&utm_source=x".parse().unwrap();
        assert_eq!(p.target_url(&uri).as_str(), "https://web.example.com/pricing?plan=pro&utm_source=x");

        let root: Uri = "/".parse().unwrap();
        assert_eq!(p.target_url(&root).as_str(), "https://web.example.com/");
    }

    #[test]
    fn test_target_url_stays_on_upstream_host() {
        let p = proxy();
        let uri: Uri = "//evil.example/steal".parse().unwrap();
        let url = p.target_url(&uri);
        assert_eq!(url.host_str(), Some("web.example.com"));
    }

    #[test]
    fn test_redirect_rewrites_location_only() {
        let p = proxy();
        let response = p.redirect(
            StatusCode::MOVED_PERMANENTLY,
            &HeaderValue::from_static("https://web.example.com/new"),
        );
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(response.headers().len(), 1);
        assert_eq!(response.headers()[header::LOCATION], "https://example.com/new");
    }

    #[test]
    fn test_still_encoded() {
        let mut headers = HeaderMap::new();
        assert_eq!(still_encoded(&headers), None);

        headers.insert(header::CONTENT_ENCODING, HeaderValue::from_static("Identity"));
        assert_eq!(still_encoded(&headers), None);

        headers.insert(header::CONTENT_ENCODING, HeaderValue::from_static("x-custom"));
        assert_eq!(still_encoded(&headers).as_deref(), Some("x-custom"));
    }

    #[tokio::test]
    async fn test_idle_bounded_passes_chunks_through() {
        let chunks = stream::iter(vec![
            Ok::<_, reqwest::Error>(Bytes::from_static(b"ab")),
            Ok(Bytes::from_static(b"cd")),
        ]);
        let collected: Vec<Bytes> = idle_bounded(chunks, Duration::from_millis(50))
            .map(|chunk| chunk.unwrap())
            .collect()
            .await;
        assert_eq!(collected, vec![Bytes::from_static(b"ab"), Bytes::from_static(b"cd")]);
    }

    #[tokio::test]
    async fn test_idle_bounded_ends_stalled_stream() {
        let chunks = stream::iter(vec![Ok::<_, reqwest::Error>(Bytes::from_static(b"abc"))])
            .chain(stream::pending());
        let mut bounded = Box::pin(idle_bounded(chunks, Duration::from_millis(50)));

        assert_eq!(bounded.next().await.unwrap().unwrap(), &b"abc"[..]);
        let err = bounded.next().await.unwrap().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
        assert!(bounded.next().await.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_bad_gateway() {
        let site = Arc::new(
            SiteConfig::new(
                Url::parse("http://127.0.0.1:1").unwrap(),
                Url::parse("https://example.com").unwrap(),
                false,
            )
            .unwrap(),
        );
        let rewriter = Arc::new(HostRewriter::new(&site).unwrap());
        let p = UpstreamProxy::new(site, rewriter, &TimeoutConfig::default()).unwrap();

        let uri: Uri = "/pricing".parse().unwrap();
        let response = p.forward(&Method::GET, &uri, &HeaderMap::new()).await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain; charset=utf-8");
    }
}

//! Header filtering between client, proxy and upstream.
//!
//! # Responsibilities
//! - Forward only an allow-list of request headers upstream
//! - Narrow `accept-encoding` to codings the upstream client can decode
//! - Strip hop-by-hop headers from relayed responses
//!
//! # Design Decisions
//! - Allow-list, not deny-list: cookies, auth and `Host` never leave the edge
//! - Multi-valued headers keep every value

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};

/// Request headers copied to the upstream request.
pub const FORWARDED_REQUEST_HEADERS: [HeaderName; 5] = [
    header::ACCEPT,
    header::ACCEPT_ENCODING,
    header::ACCEPT_LANGUAGE,
    header::USER_AGENT,
    header::CACHE_CONTROL,
];

/// Content codings reqwest decodes before HTML is rewritten.
pub const DECODABLE_CODINGS: [&str; 5] = ["gzip", "deflate", "br", "zstd", "identity"];

const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Copy the allow-listed headers from an inbound request.
pub fn forwardable_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for name in FORWARDED_REQUEST_HEADERS.iter() {
        for value in inbound.get_all(name) {
            if *name == header::ACCEPT_ENCODING {
                if let Some(value) = decodable_accept_encoding(value) {
                    headers.append(name.clone(), value);
                }
            } else {
                headers.append(name.clone(), value.clone());
            }
        }
    }
    headers
}

/// Keep the `accept-encoding` entries (with their q-values) that reqwest can
/// decode. `None` when nothing is left; reqwest then advertises its own list.
pub fn decodable_accept_encoding(value: &HeaderValue) -> Option<HeaderValue> {
    let kept = value
        .to_str()
        .ok()?
        .split(',')
        .map(str::trim)
        .filter(|entry| {
            let coding = entry.split(';').next().unwrap_or_default().trim();
            DECODABLE_CODINGS.iter().any(|c| c.eq_ignore_ascii_case(coding))
        })
        .collect::<Vec<_>>()
        .join(", ");

    if kept.is_empty() {
        return None;
    }
    HeaderValue::from_str(&kept).ok()
}

/// Whether a header only applies to a single transport hop.
pub fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(&name.as_str())
}

/// Copy response headers minus hop-by-hop ones.
pub fn relayable_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(upstream.len());
    for (name, value) in upstream.iter() {
        if !is_hop_by_hop(name) {
            headers.append(name.clone(), value.clone());
        }
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_only_allow_listed_headers_forwarded() {
        let mut inbound = HeaderMap::new();
        inbound.insert(header::HOST, HeaderValue::from_static("example.com"));
        inbound.insert(header::COOKIE, HeaderValue::from_static("session=secret"));
        inbound.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer t"));
        inbound.insert(header::USER_AGENT, HeaderValue::from_static("Googlebot/2.1"));
        inbound.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("en-US"));
        inbound.append(header::ACCEPT, HeaderValue::from_static("text/html"));
        inbound.append(header::ACCEPT, HeaderValue::from_static("*/*"));

        let forwarded = forwardable_headers(&inbound);
        assert_eq!(forwarded.len(), 4);
        assert!(forwarded.get(header::HOST).is_none());
        assert!(forwarded.get(header::COOKIE).is_none());
        assert!(forwarded.get(header::AUTHORIZATION).is_none());
        assert_eq!(forwarded.get_all(header::ACCEPT).iter().count(), 2);
        assert_eq!(forwarded[header::USER_AGENT], "Googlebot/2.1");
    }

    #[test]
    fn test_accept_encoding_narrowed_to_decodable() {
        let narrowed = |v: &'static str| {
            decodable_accept_encoding(&HeaderValue::from_static(v)).map(|v| v.to_str().unwrap().to_string())
        };
        assert_eq!(narrowed("gzip, deflate, br, zstd").as_deref(), Some("gzip, deflate, br, zstd"));
        assert_eq!(narrowed("GZIP;q=1.0, compress, zstd;q=0.5, dcb").as_deref(), Some("GZIP;q=1.0, zstd;q=0.5"));
        assert_eq!(narrowed("compress, *"), None);

        let mut inbound = HeaderMap::new();
        inbound.insert(header::ACCEPT_ENCODING, HeaderValue::from_static("sdch, br"));
        assert_eq!(forwardable_headers(&inbound)[header::ACCEPT_ENCODING], "br");

        inbound.insert(header::ACCEPT_ENCODING, HeaderValue::from_static("sdch"));
        assert!(forwardable_headers(&inbound).get(header::ACCEPT_ENCODING).is_none());
    }

    #[test]
    fn test_hop_by_hop_stripped() {
        let mut upstream = HeaderMap::new();
        upstream.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        upstream.insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        upstream.insert(header::CONTENT_TYPE, HeaderValue::from_static("image/png"));
        upstream.insert(header::ETAG, HeaderValue::from_static("\"abc\""));

        let relayed = relayable_headers(&upstream);
        assert_eq!(relayed.len(), 2);
        assert_eq!(relayed[header::CONTENT_TYPE], "image/png");
        assert_eq!(relayed[header::ETAG], "\"abc\"");
    }
}

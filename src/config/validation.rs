//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Origins must be absolute http(s) URLs with distinct hosts
//! - Validate value ranges (timeouts > 0)
//! - The request deadline outlasts store lookup plus upstream fetch
//! - Store backends must have what they need to open
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;
use url::Url;

use crate::config::schema::{ProxyConfig, StoreKind};

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: `{value}` is not a valid URL ({reason})")]
    InvalidUrl {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("{field}: `{value}` must use http or https")]
    UnsupportedScheme { field: &'static str, value: String },

    #[error("{field}: `{value}` has no host")]
    MissingHost { field: &'static str, value: String },

    #[error("upstream and canonical origins share the host `{0}`")]
    SameHost(String),

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("timeouts.request_secs ({request_ms} ms) must exceed timeouts.upstream_secs plus timeouts.store_lookup_ms ({inner_ms} ms)")]
    RequestDeadlineTooShort { request_ms: u64, inner_ms: u64 },

    #[error("passthrough prefix `{0}` must start with `/`")]
    RelativePrefix(String),

    #[error("store.path is required for the directory store")]
    MissingStorePath,

    #[error("listener.tls.{0} must not be empty")]
    EmptyTlsPath(&'static str),
}

/// Parse an origin URL and check that it is absolute http(s) with a host.
pub fn parse_origin(field: &'static str, value: &str) -> Result<Url, ValidationError> {
    let url = Url::parse(value).map_err(|e| ValidationError::InvalidUrl {
        field,
        value: value.to_string(),
        reason: e.to_string(),
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ValidationError::UnsupportedScheme {
            field,
            value: value.to_string(),
        });
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(ValidationError::MissingHost {
            field,
            value: value.to_string(),
        });
    }

    Ok(url)
}

/// Check that two parsed origins do not point at the same host.
pub fn check_distinct_hosts(upstream: &Url, canonical: &Url) -> Result<(), ValidationError> {
    match (upstream.host_str(), canonical.host_str()) {
        (Some(a), Some(b)) if a.eq_ignore_ascii_case(b) => {
            Err(ValidationError::SameHost(a.to_ascii_lowercase()))
        }
        _ => Ok(()),
    }
}

/// Validate the whole configuration, collecting every error.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let upstream = parse_origin("site.upstream_origin", &config.site.upstream_origin);
    let canonical = parse_origin("site.canonical_origin", &config.site.canonical_origin);
    match (upstream, canonical) {
        (Ok(u), Ok(c)) => {
            if let Err(e) = check_distinct_hosts(&u, &c) {
                errors.push(e);
            }
        }
        (u, c) => {
            errors.extend(u.err());
            errors.extend(c.err());
        }
    }

    let timeouts = &config.timeouts;
    if timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("timeouts.connect_secs"));
    }
    if timeouts.upstream_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("timeouts.upstream_secs"));
    }
    if timeouts.store_lookup_ms == 0 {
        errors.push(ValidationError::ZeroTimeout("timeouts.store_lookup_ms"));
    }
    if timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("timeouts.request_secs"));
    }

    // Upstream failures must surface as 502 before the outer deadline fires.
    let request_ms = timeouts.request_secs.saturating_mul(1000);
    let inner_ms = timeouts
        .upstream_secs
        .saturating_mul(1000)
        .saturating_add(timeouts.store_lookup_ms);
    if request_ms <= inner_ms {
        errors.push(ValidationError::RequestDeadlineTooShort { request_ms, inner_ms });
    }

    for prefix in &config.routing.passthrough_prefixes {
        if !prefix.starts_with('/') {
            errors.push(ValidationError::RelativePrefix(prefix.clone()));
        }
    }

    if config.store.kind == StoreKind::Directory
        && config.store.path.as_deref().map_or(true, str::is_empty)
    {
        errors.push(ValidationError::MissingStorePath);
    }

    if let Some(tls) = &config.listener.tls {
        if tls.cert_path.is_empty() {
            errors.push(ValidationError::EmptyTlsPath("cert_path"));
        }
        if tls.key_path.is_empty() {
            errors.push(ValidationError::EmptyTlsPath("key_path"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Path of an optional TOML config file.
pub const CONFIG_PATH_ENV: &str = "PRERENDER_PROXY_CONFIG";
/// Overrides `site.upstream_origin`.
pub const UPSTREAM_ORIGIN_ENV: &str = "UPSTREAM_ORIGIN";
/// Overrides `site.canonical_origin`.
pub const CANONICAL_ORIGIN_ENV: &str = "CANONICAL_ORIGIN";
/// Overrides `site.debug` (`true` / `1` enable it).
pub const DEBUG_ENV: &str = "DEBUG";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse a TOML file into a configuration without validating it.
pub fn read_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let config = read_config(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply environment overrides on top of file or default values.
///
/// Empty variables count as unset, so the fallbacks stay in effect.
pub fn apply_env_overrides<F>(config: &mut ProxyConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(origin) = get(UPSTREAM_ORIGIN_ENV) {
        config.site.upstream_origin = origin.trim().to_string();
    }
    if let Some(origin) = get(CANONICAL_ORIGIN_ENV) {
        config.site.canonical_origin = origin.trim().to_string();
    }
    if let Some(debug) = get(DEBUG_ENV) {
        let debug = debug.trim();
        config.site.debug = debug.eq_ignore_ascii_case("true") || debug == "1";
    }
}

/// Resolve the process configuration: optional file, then environment, then validation.
pub fn resolve_config<F>(lookup: F) -> Result<ProxyConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match lookup(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
        Some(path) => read_config(Path::new(&path))?,
        None => ProxyConfig::default(),
    };

    apply_env_overrides(&mut config, &lookup);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_overrides_origins_and_debug() {
        let mut config = ProxyConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[
                (UPSTREAM_ORIGIN_ENV, "https://render.internal.test"),
                (CANONICAL_ORIGIN_ENV, "https://www.public.test"),
                (DEBUG_ENV, "true"),
            ]),
        );

        assert_eq!(config.site.upstream_origin, "https://render.internal.test");
        assert_eq!(config.site.canonical_origin, "https://www.public.test");
        assert!(config.site.debug);
    }

    #[test]
    fn test_empty_env_keeps_fallbacks() {
        let mut config = ProxyConfig::default();
        apply_env_overrides(&mut config, env(&[(UPSTREAM_ORIGIN_ENV, ""), (DEBUG_ENV, " ")]));

        assert_eq!(config.site.upstream_origin, "https://web.example.com");
        assert!(!config.site.debug);
    }

    #[test]
    fn test_resolve_rejects_bad_env_origin() {
        let err = resolve_config(env(&[(CANONICAL_ORIGIN_ENV, "not a url")])).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref e) if e.len() == 1));
        assert!(err.to_string().starts_with("Validation failed: site.canonical_origin"));
    }

    #[test]
    fn test_load_config_from_file() {
        let path = std::env::temp_dir().join(format!("prerender-proxy-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            r#"
[site]
upstream_origin = "http://127.0.0.1:3000"
canonical_origin = "https://public.example"
debug = true

[cache]
max_age_secs = 600
max_staleness_secs = 86400

[store]
kind = "directory"
path = "./dist"
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.site.upstream_origin, "http://127.0.0.1:3000");
        assert!(config.site.debug);
        assert_eq!(config.cache.max_age_secs, 600);
        assert_eq!(config.cache.max_staleness_secs, Some(86400));
        assert_eq!(config.store.path.as_deref(), Some("./dist"));
        assert_eq!(config.timeouts.upstream_secs, 15);

        std::fs::remove_file(path).unwrap_or_default();
    }
}

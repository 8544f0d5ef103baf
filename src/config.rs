//! Gateway configuration loaded from the environment.

use std::time::Duration;

use thiserror::Error;

use crate::server::DEFAULT_PORT;
use crate::upstream::UpstreamConfig;

/// Upstream API base URL.
pub const API_URL_ENV: &str = "API_URL";
/// Upstream application API key.
pub const API_KEY_ENV: &str = "API_KEY";
/// Upstream application id (informational).
pub const APP_ID_ENV: &str = "APP_ID";
/// Listening port.
pub const PORT_ENV: &str = "CONVARS_PORT";
/// Upstream request timeout in seconds.
pub const REQUEST_TIMEOUT_ENV: &str = "CONVARS_REQUEST_TIMEOUT_SECS";
/// Upstream connect timeout in seconds.
pub const CONNECT_TIMEOUT_ENV: &str = "CONVARS_CONNECT_TIMEOUT_SECS";
/// Whether the session cookie is marked `Secure`.
pub const COOKIE_SECURE_ENV: &str = "CONVARS_COOKIE_SECURE";

/// Errors raised while reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    /// A variable is set but cannot be parsed.
    #[error("invalid value for {name}: {value:?}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// Offending value.
        value: String,
    },
}

/// Complete gateway configuration.
#[derive(Clone, Debug)]
pub struct GatewayConfig {
    /// Upstream API settings.
    pub upstream: UpstreamConfig,
    /// Upstream application id, if known.
    pub app_id: Option<String>,
    /// Listening port.
    pub port: u16,
    /// Whether the session cookie is marked `Secure`.
    pub cookie_secure: bool,
}

impl GatewayConfig {
    /// Create a config with default server settings.
    #[must_use]
    pub const fn new(upstream: UpstreamConfig) -> Self {
        Self {
            upstream,
            app_id: None,
            port: DEFAULT_PORT,
            cookie_secure: false,
        }
    }

    /// Load the configuration from the process environment.
    ///
    /// A `.env` file in the working directory is read first when present.
    ///
    /// # Errors
    /// Returns an error if a required variable is missing or a value is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    ///
    /// # Errors
    /// Returns an error if a required variable is missing or a value is invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let base_url = required(API_URL_ENV)?;
        let api_key = required(API_KEY_ENV)?;

        let mut upstream = UpstreamConfig::new(base_url, api_key);
        if let Some(secs) = parse_var(&lookup, REQUEST_TIMEOUT_ENV)? {
            upstream = upstream.with_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = parse_var(&lookup, CONNECT_TIMEOUT_ENV)? {
            upstream = upstream.with_connect_timeout(Duration::from_secs(secs));
        }

        let cookie_secure = lookup(COOKIE_SECURE_ENV)
            .is_some_and(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"));

        Ok(Self {
            upstream,
            app_id: lookup(APP_ID_ENV).filter(|v| !v.is_empty()),
            port: parse_var(&lookup, PORT_ENV)?.unwrap_or(DEFAULT_PORT),
            cookie_secure,
        })
    }

    /// Set the listening port.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the upstream request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.upstream = self.upstream.with_timeout(timeout);
        self
    }

    /// Mark the session cookie `Secure`.
    #[must_use]
    pub const fn with_cookie_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }
}

fn parse_var<F, T>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_minimal_config() {
        let config = GatewayConfig::from_lookup(lookup(&[
            ("API_URL", "https://api.dify.ai/v1"),
            ("API_KEY", "app-key"),
        ]))
        .expect("config");

        assert_eq!(config.upstream.base_url, "https://api.dify.ai/v1");
        assert_eq!(config.upstream.api_key, "app-key");
        assert_eq!(config.upstream.request_timeout, Duration::from_secs(30));
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.app_id, None);
        assert!(!config.cookie_secure);
    }

    #[test]
    fn test_full_config() {
        let config = GatewayConfig::from_lookup(lookup(&[
            ("API_URL", "http://localhost:5001/v1"),
            ("API_KEY", "app-key"),
            ("APP_ID", "app-123"),
            ("CONVARS_PORT", "8080"),
            ("CONVARS_REQUEST_TIMEOUT_SECS", "5"),
            ("CONVARS_CONNECT_TIMEOUT_SECS", "2"),
            ("CONVARS_COOKIE_SECURE", "true"),
        ]))
        .expect("config");

        assert_eq!(config.port, 8080);
        assert_eq!(config.app_id, Some("app-123".to_string()));
        assert_eq!(config.upstream.request_timeout, Duration::from_secs(5));
        assert_eq!(config.upstream.connect_timeout, Duration::from_secs(2));
        assert!(config.cookie_secure);
    }

    #[test]
    fn test_missing_required() {
        let err = GatewayConfig::from_lookup(lookup(&[("API_KEY", "k")])).expect_err("missing url");
        assert!(matches!(err, ConfigError::Missing("API_URL")));

        let err = GatewayConfig::from_lookup(lookup(&[("API_URL", "http://x"), ("API_KEY", " ")]))
            .expect_err("blank key");
        assert!(matches!(err, ConfigError::Missing("API_KEY")));
    }

    #[test]
    fn test_invalid_port() {
        let err = GatewayConfig::from_lookup(lookup(&[
            ("API_URL", "http://x"),
            ("API_KEY", "k"),
            ("CONVARS_PORT", "eighty"),
        ]))
        .expect_err("bad port");
        assert_eq!(err.to_string(), "invalid value for CONVARS_PORT: \"eighty\"");
    }

    #[test]
    fn test_builders() {
        let config = GatewayConfig::new(UpstreamConfig::new("http://x", "k"))
            .with_port(4000)
            .with_timeout(Duration::from_secs(7))
            .with_cookie_secure(true);
        assert_eq!(config.port, 4000);
        assert_eq!(config.upstream.request_timeout, Duration::from_secs(7));
        assert!(config.cookie_secure);
    }
}

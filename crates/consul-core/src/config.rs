//! Configuration structures for Consul clients.
//!
//! This module provides the configuration for connecting to a Consul agent: the base URL,
//! the ACL token, TLS settings, timeouts and retries. Configuration can be built in code,
//! read from the standard `CONSUL_*` environment variables, or loaded from a JSON file.

use crate::Error;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::error;
use url::Url;
use validator::Validate;

/// Message reported when no agent address can be resolved.
pub const NO_URL_MESSAGE: &str = "No Consul URL found.";

/// Environment variable holding the agent address.
pub const ENV_HTTP_ADDR: &str = "CONSUL_HTTP_ADDR";
/// Environment variable holding the ACL token.
pub const ENV_HTTP_TOKEN: &str = "CONSUL_HTTP_TOKEN";
/// Environment variable naming the datacenter to target.
pub const ENV_DATACENTER: &str = "CONSUL_DATACENTER";
/// Environment variable selecting `https` for scheme-less addresses.
pub const ENV_HTTP_SSL: &str = "CONSUL_HTTP_SSL";
/// Environment variable toggling TLS certificate verification.
pub const ENV_HTTP_SSL_VERIFY: &str = "CONSUL_HTTP_SSL_VERIFY";
/// Environment variable pointing at a PEM CA bundle.
pub const ENV_CACERT: &str = "CONSUL_CACERT";

/// Configuration for a Consul client instance.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ConsulConfig {
    /// Consul agent base URL (e.g. `http://127.0.0.1:8500`)
    #[validate(url)]
    pub url: String,

    /// ACL token sent as `X-Consul-Token`
    #[serde(default, skip_serializing, deserialize_with = "deserialize_token")]
    pub token: Option<SecretString>,

    /// Datacenter to target instead of the agent's own
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datacenter: Option<String>,

    /// Whether to verify TLS certificates
    #[serde(default = "default_tls_verify")]
    pub tls_verify: bool,

    /// Optional path to custom CA certificate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls_ca_cert: Option<PathBuf>,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300))]
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Maximum number of retry attempts
    #[validate(range(min = 0, max = 10))]
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

const fn default_tls_verify() -> bool {
    true
}

const fn default_request_timeout_secs() -> u64 {
    30
}

const fn default_max_retries() -> u32 {
    3
}

fn deserialize_token<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    let token: Option<String> = Option::deserialize(deserializer)?;
    Ok(token
        .filter(|t| !t.is_empty())
        .map(SecretString::from))
}

impl ConsulConfig {
    /// Create a new client configuration for the given agent URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is empty, invalid, or validation fails.
    pub fn new(url: impl Into<String>) -> Result<Self, Error> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(Error::ConfigError(NO_URL_MESSAGE.to_string()));
        }

        let config = Self {
            url,
            ..Self::default()
        };

        config
            .validate()
            .map_err(|e| Error::ConfigError(format!("Invalid configuration: {e}")))?;

        Ok(config)
    }

    /// Resolve configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] when `CONSUL_HTTP_ADDR` is unset or invalid.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration using an arbitrary variable lookup.
    ///
    /// Addresses without a scheme get `http://` (or `https://` when `CONSUL_HTTP_SSL` is
    /// true) prepended, matching the Consul CLI.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] when no address is available or it fails validation.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let Some(addr) = lookup(ENV_HTTP_ADDR).filter(|a| !a.trim().is_empty()) else {
            error!("{NO_URL_MESSAGE}");
            return Err(Error::ConfigError(NO_URL_MESSAGE.to_string()));
        };

        let url = if addr.contains("://") {
            addr
        } else if lookup(ENV_HTTP_SSL).as_deref().is_some_and(parse_bool) {
            format!("https://{addr}")
        } else {
            format!("http://{addr}")
        };

        let mut config = Self::new(url)?;

        if let Some(token) = lookup(ENV_HTTP_TOKEN).filter(|t| !t.is_empty()) {
            config = config.with_token(token);
        }

        if let Some(dc) = lookup(ENV_DATACENTER).filter(|d| !d.is_empty()) {
            config = config.with_datacenter(dc);
        }

        if let Some(verify) = lookup(ENV_HTTP_SSL_VERIFY) {
            config = config.with_tls_verify(parse_bool(&verify));
        }

        if let Some(path) = lookup(ENV_CACERT).filter(|p| !p.is_empty()) {
            config = config.with_ca_cert(PathBuf::from(path));
        }

        Ok(config)
    }

    /// Load configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or fails validation.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|err| {
            Error::ConfigError(format!(
                "Failed to read Consul configuration {}: {err}",
                path.display()
            ))
        })?;

        let config: Self = serde_json::from_str(&raw).map_err(|err| {
            Error::ConfigError(format!(
                "Invalid Consul configuration {}: {err}",
                path.display()
            ))
        })?;

        if config.url.trim().is_empty() {
            return Err(Error::ConfigError(NO_URL_MESSAGE.to_string()));
        }
        config.validate()?;

        Ok(config)
    }

    /// Set the ACL token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(SecretString::from(token.into()));
        self
    }

    /// Target a specific datacenter.
    #[must_use]
    pub fn with_datacenter(mut self, datacenter: impl Into<String>) -> Self {
        self.datacenter = Some(datacenter.into());
        self
    }

    /// Set whether to verify TLS certificates.
    #[must_use]
    pub const fn with_tls_verify(mut self, verify: bool) -> Self {
        self.tls_verify = verify;
        self
    }

    /// Set custom CA certificate path.
    #[must_use]
    pub fn with_ca_cert(mut self, path: PathBuf) -> Self {
        self.tls_ca_cert = Some(path);
        self
    }

    /// Set request timeout in seconds.
    #[must_use]
    pub const fn with_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout_secs = seconds;
        self
    }

    /// Set maximum retry attempts.
    #[must_use]
    pub const fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Whether an ACL token is configured.
    #[must_use]
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub(crate) fn token_value(&self) -> Option<&str> {
        self.token.as_ref().map(|token| token.expose_secret())
    }

    /// Parse and validate the agent URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn parse_url(&self) -> Result<Url, Error> {
        Url::parse(&self.url).map_err(|e| Error::ConfigError(format!("Invalid Consul URL: {e}")))
    }
}

impl Default for ConsulConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8500".to_string(),
            token: None,
            datacenter: None,
            tls_verify: default_tls_verify(),
            tls_ca_cert: None,
            request_timeout_secs: default_request_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_consul_config_new() {
        let config = ConsulConfig::new("http://localhost:8500").unwrap();
        assert_eq!(config.url, "http://localhost:8500");
        assert!(config.tls_verify);
        assert!(!config.has_token());
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn test_consul_config_empty_url() {
        let err = ConsulConfig::new("").unwrap_err();
        assert_eq!(err, Error::ConfigError(NO_URL_MESSAGE.to_string()));
    }

    #[test]
    fn test_consul_config_invalid_url() {
        assert!(ConsulConfig::new("not-a-url").is_err());
    }

    #[test]
    fn test_consul_config_builder() {
        let config = ConsulConfig::new("https://consul.example.com")
            .unwrap()
            .with_token("secret-token")
            .with_datacenter("dc2")
            .with_tls_verify(false)
            .with_timeout(60)
            .with_max_retries(5);

        assert_eq!(config.token_value(), Some("secret-token"));
        assert_eq!(config.datacenter.as_deref(), Some("dc2"));
        assert!(!config.tls_verify);
        assert_eq!(config.timeout(), Duration::from_secs(60));
        assert_eq!(config.max_retries, 5);
    }

    #[test]
    fn test_token_is_redacted_in_debug() {
        let config = ConsulConfig::default().with_token("super-secret");
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
    }

    #[test]
    fn test_from_lookup_missing_address() {
        let err = ConsulConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert_eq!(err, Error::ConfigError("No Consul URL found.".to_string()));
    }

    #[test]
    fn test_from_lookup_adds_scheme() {
        let config =
            ConsulConfig::from_lookup(lookup_from(&[(ENV_HTTP_ADDR, "127.0.0.1:8500")])).unwrap();
        assert_eq!(config.url, "http://127.0.0.1:8500");

        let config = ConsulConfig::from_lookup(lookup_from(&[
            (ENV_HTTP_ADDR, "consul.service:8501"),
            (ENV_HTTP_SSL, "true"),
        ]))
        .unwrap();
        assert_eq!(config.url, "https://consul.service:8501");
    }

    #[test]
    fn test_from_lookup_reads_token_and_tls() {
        let config = ConsulConfig::from_lookup(lookup_from(&[
            (ENV_HTTP_ADDR, "https://consul.example.com"),
            (ENV_HTTP_TOKEN, "abc"),
            (ENV_DATACENTER, "east"),
            (ENV_HTTP_SSL_VERIFY, "false"),
            (ENV_CACERT, "/etc/consul/ca.pem"),
        ]))
        .unwrap();

        assert_eq!(config.token_value(), Some("abc"));
        assert_eq!(config.datacenter.as_deref(), Some("east"));
        assert!(!config.tls_verify);
        assert_eq!(
            config.tls_ca_cert,
            Some(PathBuf::from("/etc/consul/ca.pem"))
        );
    }

    #[test]
    fn test_deserialize_with_token() {
        let config: ConsulConfig = serde_json::from_str(
            r#"{"url": "http://consul:8500", "token": "t0k3n", "datacenter": "dc1"}"#,
        )
        .unwrap();
        assert_eq!(config.token_value(), Some("t0k3n"));
        assert_eq!(config.datacenter.as_deref(), Some("dc1"));
        assert_eq!(config.request_timeout_secs, 30);

        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("t0k3n"));
    }

    #[test]
    fn test_from_json_file() {
        let path = std::env::temp_dir().join(format!(
            "consul-config-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, r#"{"url": "http://10.0.0.5:8500", "max_retries": 1}"#).unwrap();

        let config = ConsulConfig::from_json_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.url, "http://10.0.0.5:8500");
        assert_eq!(config.max_retries, 1);
    }

    #[test]
    fn test_parse_url() {
        let config = ConsulConfig::new("https://consul.example.com:8501").unwrap();
        let url = config.parse_url().unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("consul.example.com"));
        assert_eq!(url.port(), Some(8501));
    }

    #[test]
    fn test_config_validation_timeout_range() {
        let mut config = ConsulConfig::default();
        config.request_timeout_secs = 0;
        assert!(config.validate().is_err());

        config.request_timeout_secs = 301;
        assert!(config.validate().is_err());

        config.request_timeout_secs = 30;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_retries_range() {
        let mut config = ConsulConfig::default();
        config.max_retries = 11;
        assert!(config.validate().is_err());

        config.max_retries = 3;
        assert!(config.validate().is_ok());
    }
}

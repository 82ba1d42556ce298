//! HTTP client utilities and retry logic.
//!
//! This module provides HTTP client configuration, retry policies and [`ServiceClient`],
//! the request executor shared by the Consul API wrappers.

use crate::config::ConsulConfig;
use crate::{Error, Result};
use reqwest::{Client, ClientBuilder, Method, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use url::Url;

/// Consul HTTP API version prefix.
pub const API_VERSION: &str = "v1";

/// Header carrying the ACL token.
pub const TOKEN_HEADER: &str = "X-Consul-Token";

/// Default connect timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT: u64 = 10;

// Connection pool settings

/// Default idle timeout for connection pools
pub const DEFAULT_POOL_IDLE_TIMEOUT: u64 = 90;

/// Default maximum idle connections per host
pub const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 10;

// Retry settings

/// Default maximum number of retry attempts
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default initial retry delay in milliseconds
pub const DEFAULT_RETRY_DELAY_MS: u64 = 500;

/// Default maximum retry delay in milliseconds (for exponential backoff)
pub const DEFAULT_RETRY_MAX_DELAY_MS: u64 = 5000;

/// Retry policy with exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts
    pub max_retries: u32,

    /// Initial delay before first retry
    pub initial_delay: Duration,

    /// Maximum delay between retries (cap for exponential backoff)
    pub max_delay: Duration,

    /// Backoff multiplier (typically 2 for exponential backoff)
    pub backoff_multiplier: u32,
}

impl RetryPolicy {
    /// Create a new retry policy with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            max_delay: Duration::from_millis(DEFAULT_RETRY_MAX_DELAY_MS),
            backoff_multiplier: 2,
        }
    }

    /// Create a retry policy with no retries.
    #[must_use]
    pub const fn no_retry() -> Self {
        Self {
            max_retries: 0,
            initial_delay: Duration::from_millis(0),
            max_delay: Duration::from_millis(0),
            backoff_multiplier: 1,
        }
    }

    /// Set the maximum number of retries.
    #[must_use]
    pub const fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the initial delay.
    #[must_use]
    pub const fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set the maximum delay.
    #[must_use]
    pub const fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Set the backoff multiplier.
    #[must_use]
    pub const fn with_backoff_multiplier(mut self, multiplier: u32) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Calculate delay for a given attempt number.
    ///
    /// Uses exponential backoff: delay = min(initial_delay * multiplier^(attempt-1), max_delay)
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::from_secs(0);
        }

        let multiplier = self.backoff_multiplier.saturating_pow(attempt - 1);
        let initial_ms = u64::try_from(self.initial_delay.as_millis()).unwrap_or(u64::MAX);
        let delay = Duration::from_millis(initial_ms.saturating_mul(u64::from(multiplier)));

        std::cmp::min(delay, self.max_delay)
    }

    /// Check if retries are enabled.
    #[must_use]
    pub const fn has_retries(&self) -> bool {
        self.max_retries > 0
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout
    pub timeout: Duration,

    /// Retry policy
    pub retry_policy: RetryPolicy,

    /// Connection pool idle timeout
    pub pool_idle_timeout: Duration,

    /// Maximum idle connections per host
    pub pool_max_idle_per_host: usize,

    /// Enable response compression
    pub enable_compression: bool,
}

impl ClientConfig {
    /// Create a new client configuration with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            retry_policy: RetryPolicy::new(),
            pool_idle_timeout: Duration::from_secs(DEFAULT_POOL_IDLE_TIMEOUT),
            pool_max_idle_per_host: DEFAULT_POOL_MAX_IDLE_PER_HOST,
            enable_compression: true,
        }
    }

    /// Set request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set retry policy.
    #[must_use]
    pub const fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Disable retries.
    #[must_use]
    pub const fn without_retries(mut self) -> Self {
        self.retry_policy = RetryPolicy::no_retry();
        self
    }

    /// Set connection pool idle timeout.
    #[must_use]
    pub const fn with_pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = timeout;
        self
    }

    /// Set maximum idle connections per host.
    #[must_use]
    pub const fn with_pool_max_idle(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = max;
        self
    }

    /// Enable or disable compression.
    #[must_use]
    pub const fn with_compression(mut self, enabled: bool) -> Self {
        self.enable_compression = enabled;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`ServiceClient`].
#[derive(Debug, Clone)]
pub struct ServiceClientBuilder {
    config: ConsulConfig,
    http_config: ClientConfig,
    retry_policy: Option<RetryPolicy>,
    user_agent: String,
}

impl ServiceClientBuilder {
    /// Create a builder from a [`ConsulConfig`].
    #[must_use]
    pub fn new(config: ConsulConfig) -> Self {
        Self {
            config,
            http_config: ClientConfig::new(),
            retry_policy: None,
            user_agent: concat!("consul-core/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    /// Override the retry policy, including the retry count from the configuration.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry_policy = Some(retry);
        self
    }

    /// Override the HTTP client configuration and its retry policy.
    #[must_use]
    pub fn with_http_config(mut self, config: ClientConfig) -> Self {
        self.retry_policy = Some(config.retry_policy);
        self.http_config = config;
        self
    }

    /// Override the `User-Agent` header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Finalise the builder and create the [`ServiceClient`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the URL is invalid, the CA certificate cannot be
    /// loaded, or the HTTP client cannot be constructed.
    pub fn build(self) -> Result<ServiceClient> {
        let base_url = self.config.parse_url()?;
        if base_url.cannot_be_a_base() {
            return Err(Error::ConfigError(format!(
                "Consul URL `{base_url}` cannot be used as a base URL"
            )));
        }

        let mut http_config = self.http_config;
        http_config.timeout = self.config.timeout();
        http_config.retry_policy = self
            .retry_policy
            .unwrap_or_else(|| RetryPolicy::new().with_max_retries(self.config.max_retries));

        let mut builder = ClientBuilder::new()
            .user_agent(self.user_agent)
            .timeout(http_config.timeout)
            .pool_idle_timeout(http_config.pool_idle_timeout)
            .pool_max_idle_per_host(http_config.pool_max_idle_per_host)
            .gzip(http_config.enable_compression)
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT));

        if !self.config.tls_verify {
            warn!("TLS verification disabled for Consul client");
            builder = builder.danger_accept_invalid_certs(true);
        }

        if let Some(ca_cert) = &self.config.tls_ca_cert {
            debug!("loading Consul CA certificate from {}", ca_cert.display());
            let bytes = std::fs::read(ca_cert).map_err(|err| {
                Error::ConfigError(format!(
                    "Failed to read Consul CA certificate {}: {err}",
                    ca_cert.display()
                ))
            })?;
            let cert = reqwest::Certificate::from_pem(&bytes).map_err(|err| {
                Error::ConfigError(format!("Invalid Consul CA certificate: {err}"))
            })?;
            builder = builder.add_root_certificate(cert);
        }

        let http = builder.build().map_err(|err| {
            Error::ConfigError(format!("Failed to build Consul HTTP client: {err}"))
        })?;

        Ok(ServiceClient {
            http,
            base_url,
            token: self.config.token_value().map(|t| SecretString::from(t.to_string())),
            datacenter: self.config.datacenter.clone(),
            retry_policy: http_config.retry_policy,
        })
    }
}

/// Request executor bound to a single Consul agent.
///
/// Every request is sent to `{base_url}/v1/{path}` with the ACL token and datacenter
/// from the configuration, and is retried on transient failures.
#[derive(Clone)]
pub struct ServiceClient {
    http: Client,
    base_url: Url,
    token: Option<SecretString>,
    datacenter: Option<String>,
    retry_policy: RetryPolicy,
}

impl ServiceClient {
    /// Construct a client directly from the configuration.
    ///
    /// # Errors
    ///
    /// See [`ServiceClientBuilder::build`].
    pub fn from_config(config: &ConsulConfig) -> Result<Self> {
        ServiceClientBuilder::new(config.clone()).build()
    }

    /// Return the agent base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Return the datacenter requests are pinned to, if any.
    #[must_use]
    pub fn datacenter(&self) -> Option<&str> {
        self.datacenter.as_deref()
    }

    /// Return the effective retry policy.
    #[must_use]
    pub const fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Build the full URL for an API path such as `kv/cluster/key`.
    ///
    /// Each `/`-separated segment is percent-encoded on its own.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEndpoint`] if the base URL cannot carry a path.
    pub fn build_url(&self, path: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                Error::InvalidEndpoint(format!("Invalid Consul base URL `{}`", self.base_url))
            })?
            .pop_if_empty()
            .push(API_VERSION)
            .extend(path.trim_start_matches('/').split('/'));
        Ok(url)
    }

    /// Send a request, retrying on transient failures, and return the final response.
    ///
    /// Responses with retryable statuses (429, 5xx) are retried until the policy is
    /// exhausted; the last response is returned whatever its status so the caller can
    /// classify it. Only use this for requests that are safe to repeat.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent after all retries.
    pub async fn send_with_retry<D>(
        &self,
        method: Method,
        path: &str,
        params: &[(&'static str, String)],
        decorate: D,
    ) -> Result<Response>
    where
        D: FnMut(RequestBuilder) -> RequestBuilder,
    {
        self.send(&self.retry_policy, method, path, params, decorate)
            .await
    }

    /// Send a request exactly once and return the response whatever its status.
    ///
    /// Writes go through here: a request that timed out may already have been applied
    /// by the agent.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent.
    pub async fn send_once<D>(
        &self,
        method: Method,
        path: &str,
        params: &[(&'static str, String)],
        decorate: D,
    ) -> Result<Response>
    where
        D: FnMut(RequestBuilder) -> RequestBuilder,
    {
        self.send(&RetryPolicy::no_retry(), method, path, params, decorate)
            .await
    }

    async fn send<D>(
        &self,
        policy: &RetryPolicy,
        method: Method,
        path: &str,
        params: &[(&'static str, String)],
        mut decorate: D,
    ) -> Result<Response>
    where
        D: FnMut(RequestBuilder) -> RequestBuilder,
    {
        let mut attempt = 0;

        loop {
            let url = self.build_url(path)?;
            let mut request = self.http.request(method.clone(), url).query(params);

            if let Some(dc) = &self.datacenter {
                request = request.query(&[("dc", dc)]);
            }

            if let Some(token) = &self.token {
                request = request.header(TOKEN_HEADER, token.expose_secret());
            }

            request = decorate(request);

            info!(%method, path = %path, attempt, "Sending Consul request");

            let retry_reason = match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if !is_retryable_status(status) || attempt >= policy.max_retries {
                        return Ok(response);
                    }
                    format!("status {status}")
                }
                Err(err) => {
                    let error = Error::from(err);
                    if !error.is_retryable() || attempt >= policy.max_retries {
                        return Err(error);
                    }
                    error.to_string()
                }
            };

            attempt += 1;
            let delay = policy.delay_for_attempt(attempt);
            debug!(path = %path, reason = %retry_reason, ?delay, "Retrying Consul request");
            if delay > Duration::from_millis(0) {
                sleep(delay).await;
            }
        }
    }

    /// Send a request and map any non-success status to an error.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `map_error` for non-2xx responses, or the transport
    /// error if the request could not be completed.
    pub async fn execute_with_retry<D, M>(
        &self,
        method: Method,
        path: &str,
        params: &[(&'static str, String)],
        decorate: D,
        map_error: M,
    ) -> Result<Response>
    where
        D: FnMut(RequestBuilder) -> RequestBuilder,
        M: Fn(StatusCode, String) -> Error,
    {
        let response = self.send_with_retry(method, path, params, decorate).await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(map_error(status, text))
    }
}

/// Returns true for statuses worth retrying.
#[must_use]
pub fn is_retryable_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    ) || status.is_server_error()
}

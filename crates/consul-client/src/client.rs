//! Asynchronous Consul client implementation.
//!
//! [`ConsulClient`] owns the HTTP plumbing; each API group is reached through a borrowed
//! endpoint handle such as [`ConsulClient::kv`] or [`ConsulClient::agent`].

use crate::acl::AclEndpoint;
use crate::agent::AgentEndpoint;
use crate::catalog::CatalogEndpoint;
use crate::event::EventEndpoint;
use crate::health::HealthEndpoint;
use crate::kv::KvEndpoint;
use crate::session::SessionEndpoint;
use crate::status::StatusEndpoint;
use crate::Result;
use consul_core::client::{ClientConfig, RetryPolicy, ServiceClient, ServiceClientBuilder};
use consul_core::config::ConsulConfig;
use consul_core::{Error, Outcome};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;
use url::Url;

const USER_AGENT: &str = concat!("consul-client/", env!("CARGO_PKG_VERSION"));

/// Builder for [`ConsulClient`].
#[derive(Debug, Clone)]
pub struct ConsulClientBuilder {
    inner: ServiceClientBuilder,
}

impl ConsulClientBuilder {
    /// Create a builder from a configuration.
    #[must_use]
    pub fn new(config: ConsulConfig) -> Self {
        Self {
            inner: ServiceClientBuilder::new(config).with_user_agent(USER_AGENT),
        }
    }

    /// Create a builder from the `CONSUL_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] when no agent address is configured.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(ConsulConfig::from_env()?))
    }

    /// Override the retry policy for reads, including the configured retry count.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.inner = self.inner.with_retry_policy(retry);
        self
    }

    /// Override the HTTP client configuration.
    #[must_use]
    pub fn with_http_config(mut self, config: ClientConfig) -> Self {
        self.inner = self.inner.with_http_config(config);
        self
    }

    /// Override the `User-Agent` header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.inner = self.inner.with_user_agent(user_agent);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot produce an HTTP client.
    pub fn build(self) -> Result<ConsulClient> {
        let inner = self.inner.build()?;
        Ok(ConsulClient { inner })
    }
}

/// Asynchronous Consul client.
#[derive(Clone)]
pub struct ConsulClient {
    inner: ServiceClient,
}

impl ConsulClient {
    /// Construct a client directly from a configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot produce an HTTP client.
    pub fn new(config: ConsulConfig) -> Result<Self> {
        ConsulClientBuilder::new(config).build()
    }

    /// Construct a client from the `CONSUL_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] when no agent address is configured.
    pub fn from_env() -> Result<Self> {
        ConsulClientBuilder::from_env()?.build()
    }

    /// Return the agent base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        self.inner.base_url()
    }

    /// Key/value store endpoints.
    #[must_use]
    pub const fn kv(&self) -> KvEndpoint<'_> {
        KvEndpoint::new(self)
    }

    /// Local agent endpoints.
    #[must_use]
    pub const fn agent(&self) -> AgentEndpoint<'_> {
        AgentEndpoint::new(self)
    }

    /// Session endpoints.
    #[must_use]
    pub const fn session(&self) -> SessionEndpoint<'_> {
        SessionEndpoint::new(self)
    }

    /// Catalog endpoints.
    #[must_use]
    pub const fn catalog(&self) -> CatalogEndpoint<'_> {
        CatalogEndpoint::new(self)
    }

    /// Health endpoints.
    #[must_use]
    pub const fn health(&self) -> HealthEndpoint<'_> {
        HealthEndpoint::new(self)
    }

    /// Raft status endpoints.
    #[must_use]
    pub const fn status(&self) -> StatusEndpoint<'_> {
        StatusEndpoint::new(self)
    }

    /// Legacy ACL endpoints.
    #[must_use]
    pub const fn acl(&self) -> AclEndpoint<'_> {
        AclEndpoint::new(self)
    }

    /// User event endpoints.
    #[must_use]
    pub const fn event(&self) -> EventEndpoint<'_> {
        EventEndpoint::new(self)
    }

    /// GET a JSON document; any non-2xx status is an error.
    pub(crate) async fn get_json<R>(
        &self,
        path: &str,
        params: &[(&'static str, String)],
    ) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let response = self
            .inner
            .execute_with_retry(
                Method::GET,
                path,
                params,
                |request| request.header("Accept", "application/json"),
                Error::from_status,
            )
            .await?;

        response.json::<R>().await.map_err(Error::from)
    }

    /// GET a resource that may legitimately be absent; 404 yields `None`.
    pub(crate) async fn get_optional(
        &self,
        path: &str,
        params: &[(&'static str, String)],
    ) -> Result<Option<reqwest::Response>> {
        let response = self
            .inner
            .send_with_retry(Method::GET, path, params, |request| request)
            .await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::from_status(status, text));
        }

        Ok(Some(response))
    }

    /// Send a mutating request once and capture the reply without judging it.
    pub(crate) async fn write<D>(
        &self,
        method: Method,
        path: &str,
        params: &[(&'static str, String)],
        decorate: D,
    ) -> Result<Reply>
    where
        D: FnMut(RequestBuilder) -> RequestBuilder,
    {
        let response = self
            .inner
            .send_once(method, path, params, decorate)
            .await?;
        let status = response.status();
        let body = response.text().await.map_err(Error::from)?;

        Ok(Reply { status, body })
    }

    /// Send a mutating request with an optional JSON body.
    pub(crate) async fn write_json<B>(
        &self,
        method: Method,
        path: &str,
        params: &[(&'static str, String)],
        body: Option<&B>,
    ) -> Result<Reply>
    where
        B: Serialize + ?Sized,
    {
        self.write(method, path, params, |mut request| {
            if let Some(payload) = body {
                request = request.json(payload);
            }
            request
        })
        .await
    }
}

/// Status and body of a write request.
#[derive(Debug)]
pub(crate) struct Reply {
    pub(crate) status: StatusCode,
    pub(crate) body: String,
}

impl Reply {
    pub(crate) fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub(crate) fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(Error::from)
    }

    /// Success or failure depending only on the status code.
    pub(crate) fn outcome<T>(self, success: String, failure: String) -> Outcome<T> {
        if self.is_success() {
            Outcome::success(success)
        } else {
            self.refused(failure)
        }
    }

    /// A failure carrying Consul's response body.
    pub(crate) fn refused<T>(self, failure: String) -> Outcome<T> {
        warn!(status = %self.status, body = %self.body.trim(), "{failure}");
        Outcome::failure(failure).with_detail(self.body)
    }
}

/// Reject blank values with `Required argument "name" is missing.`
pub(crate) fn require_argument(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::ValidationError(format!(
            "Required argument \"{name}\" is missing."
        )));
    }
    Ok(())
}

/// Reject blank values with `Required parameter "name" is missing.`
pub(crate) fn require_parameter(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::ValidationError(format!(
            "Required parameter \"{name}\" is missing."
        )));
    }
    Ok(())
}

//! Health endpoints (`/v1/health`).

use crate::client::{require_argument, ConsulClient};
use crate::models::health::{HealthCheck, HealthState, ServiceEntry};
use crate::Result;
use consul_core::query::QueryParams;

/// Handle for health queries.
#[derive(Clone, Copy)]
pub struct HealthEndpoint<'a> {
    client: &'a ConsulClient,
}

impl<'a> HealthEndpoint<'a> {
    pub(crate) const fn new(client: &'a ConsulClient) -> Self {
        Self { client }
    }

    /// Checks on a node.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty node, or an error if the request fails.
    pub async fn node(&self, node: &str) -> Result<Vec<HealthCheck>> {
        require_argument(node, "node")?;
        self.client
            .get_json(&format!("health/node/{node}"), &[])
            .await
    }

    /// Checks bound to a service.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty service, or an error if the request fails.
    pub async fn checks(&self, service: &str) -> Result<Vec<HealthCheck>> {
        require_argument(service, "service")?;
        self.client
            .get_json(&format!("health/checks/{service}"), &[])
            .await
    }

    /// Instances of a service with their node and checks.
    ///
    /// With `passing` set, only instances whose checks all pass are returned.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty service, or an error if the request fails.
    pub async fn service(
        &self,
        service: &str,
        tag: Option<&str>,
        passing: bool,
    ) -> Result<Vec<ServiceEntry>> {
        require_argument(service, "service")?;

        let mut params = QueryParams::new();
        params.push_opt("tag", tag);
        params.push_flag("passing", passing);
        self.client
            .get_json(&format!("health/service/{service}"), &params.into_pairs())
            .await
    }

    /// Checks in a given state.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn state(&self, state: HealthState) -> Result<Vec<HealthCheck>> {
        self.client
            .get_json(&format!("health/state/{state}"), &[])
            .await
    }
}

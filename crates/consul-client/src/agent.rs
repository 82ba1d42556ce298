//! Local agent endpoints (`/v1/agent`).

use crate::client::{require_parameter, ConsulClient};
use crate::models::agent::{
    AgentMember, AgentSelf, AgentService, CheckDefinition, ServiceDefinition,
};
use crate::models::health::HealthCheck;
use crate::Result;
use consul_core::query::QueryParams;
use consul_core::Outcome;
use reqwest::Method;
use std::collections::HashMap;

/// TTL check transitions.
#[derive(Debug, Clone, Copy)]
enum TtlUpdate {
    Pass,
    Warn,
    Fail,
}

impl TtlUpdate {
    const fn segment(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Warn => "warn",
            Self::Fail => "fail",
        }
    }

    const fn status(self) -> &'static str {
        match self {
            Self::Pass => "passing",
            Self::Warn => "warning",
            Self::Fail => "critical",
        }
    }
}

/// Handle for the local agent.
#[derive(Clone, Copy)]
pub struct AgentEndpoint<'a> {
    client: &'a ConsulClient,
}

impl<'a> AgentEndpoint<'a> {
    pub(crate) const fn new(client: &'a ConsulClient) -> Self {
        Self { client }
    }

    /// Checks registered with the agent, keyed by check ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn checks(&self) -> Result<HashMap<String, HealthCheck>> {
        self.client.get_json("agent/checks", &[]).await
    }

    /// Services registered with the agent, keyed by service ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn services(&self) -> Result<HashMap<String, AgentService>> {
        self.client.get_json("agent/services", &[]).await
    }

    /// Members of the LAN gossip pool, or the WAN pool when `wan` is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn members(&self, wan: bool) -> Result<Vec<AgentMember>> {
        let mut params = QueryParams::new();
        params.push_flag("wan", wan);
        self.client
            .get_json("agent/members", &params.into_pairs())
            .await
    }

    /// Configuration and membership of the local agent.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn self_info(&self) -> Result<AgentSelf> {
        self.client.get_json("agent/self", &[]).await
    }

    /// Put the node into or out of maintenance mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn maintenance(&self, enable: bool, reason: Option<&str>) -> Result<Outcome> {
        let params = maintenance_params(enable, reason);
        let reply = self
            .client
            .write_json::<()>(Method::PUT, "agent/maintenance", &params, None)
            .await?;

        let state = if enable { "enabled" } else { "disabled" };
        Ok(reply.outcome(
            format!("Agent maintenance mode {state}."),
            "Unable to change maintenance mode for agent.".to_string(),
        ))
    }

    /// Ask the agent to join a cluster member.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty address, or an error if the request fails.
    pub async fn join(&self, address: &str, wan: bool) -> Result<Outcome> {
        require_parameter(address, "address")?;

        let mut params = QueryParams::new();
        params.push_flag("wan", wan);
        let reply = self
            .client
            .write_json::<()>(
                Method::PUT,
                &format!("agent/join/{address}"),
                &params.into_pairs(),
                None,
            )
            .await?;

        Ok(reply.outcome(
            "Agent joined the cluster".to_string(),
            "Unable to join the cluster.".to_string(),
        ))
    }

    /// Force a failed node into the `left` state.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty node, or an error if the request fails.
    pub async fn force_leave(&self, node: &str) -> Result<Outcome> {
        require_parameter(node, "node")?;

        let reply = self
            .client
            .write_json::<()>(Method::PUT, &format!("agent/force-leave/{node}"), &[], None)
            .await?;

        Ok(reply.outcome(
            format!("Node {node} put in leave state."),
            format!("Unable to change state for {node}."),
        ))
    }

    /// Register a check with the agent.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an incomplete definition, or an error if the
    /// request fails.
    pub async fn check_register(&self, check: &CheckDefinition) -> Result<Outcome> {
        check.validate()?;

        let reply = self
            .client
            .write_json(Method::PUT, "agent/check/register", &[], Some(check))
            .await?;

        Ok(reply.outcome(
            format!("Check {} added to agent.", check.name),
            "Unable to add check to agent.".to_string(),
        ))
    }

    /// Remove a check from the agent.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty ID, or an error if the request fails.
    pub async fn check_deregister(&self, check_id: &str) -> Result<Outcome> {
        require_parameter(check_id, "checkid")?;

        let reply = self
            .client
            .write_json::<()>(
                Method::PUT,
                &format!("agent/check/deregister/{check_id}"),
                &[],
                None,
            )
            .await?;

        Ok(reply.outcome(
            format!("Check {check_id} removed from agent."),
            "Unable to remove check from agent.".to_string(),
        ))
    }

    /// Mark a TTL check as passing.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty ID, or an error if the request fails.
    pub async fn check_pass(&self, check_id: &str, note: Option<&str>) -> Result<Outcome> {
        self.update_ttl(check_id, TtlUpdate::Pass, note).await
    }

    /// Mark a TTL check as warning.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty ID, or an error if the request fails.
    pub async fn check_warn(&self, check_id: &str, note: Option<&str>) -> Result<Outcome> {
        self.update_ttl(check_id, TtlUpdate::Warn, note).await
    }

    /// Mark a TTL check as critical.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty ID, or an error if the request fails.
    pub async fn check_fail(&self, check_id: &str, note: Option<&str>) -> Result<Outcome> {
        self.update_ttl(check_id, TtlUpdate::Fail, note).await
    }

    /// Register a service, with its optional check, on the agent.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an incomplete definition, or an error if the
    /// request fails.
    pub async fn service_register(&self, service: &ServiceDefinition) -> Result<Outcome> {
        service.validate()?;

        let reply = self
            .client
            .write_json(Method::PUT, "agent/service/register", &[], Some(service))
            .await?;

        let name = &service.name;
        Ok(reply.outcome(
            format!("Service {name} registered on agent."),
            format!("Unable to register service {name}."),
        ))
    }

    /// Remove a service from the agent.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty ID, or an error if the request fails.
    pub async fn service_deregister(&self, service_id: &str) -> Result<Outcome> {
        require_parameter(service_id, "serviceid")?;

        let reply = self
            .client
            .write_json::<()>(
                Method::PUT,
                &format!("agent/service/deregister/{service_id}"),
                &[],
                None,
            )
            .await?;

        Ok(reply.outcome(
            format!("Service {service_id} removed from agent."),
            format!("Unable to remove service {service_id}."),
        ))
    }

    /// Put a service into or out of maintenance mode.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty ID, or an error if the request fails.
    pub async fn service_maintenance(
        &self,
        service_id: &str,
        enable: bool,
        reason: Option<&str>,
    ) -> Result<Outcome> {
        require_parameter(service_id, "serviceid")?;

        let params = maintenance_params(enable, reason);
        let reply = self
            .client
            .write_json::<()>(
                Method::PUT,
                &format!("agent/service/maintenance/{service_id}"),
                &params,
                None,
            )
            .await?;

        let state = if enable {
            "set in"
        } else {
            "taken out of"
        };
        Ok(reply.outcome(
            format!("Service {service_id} {state} maintenance mode."),
            format!("Unable to set service {service_id} to maintenance mode."),
        ))
    }

    async fn update_ttl(
        &self,
        check_id: &str,
        update: TtlUpdate,
        note: Option<&str>,
    ) -> Result<Outcome> {
        require_parameter(check_id, "checkid")?;

        let mut params = QueryParams::new();
        params.push_opt("note", note);
        let reply = self
            .client
            .write_json::<()>(
                Method::PUT,
                &format!("agent/check/{}/{check_id}", update.segment()),
                &params.into_pairs(),
                None,
            )
            .await?;

        Ok(reply.outcome(
            format!("Check {check_id} marked as {}.", update.status()),
            format!("Unable to update check {check_id}."),
        ))
    }
}

fn maintenance_params(enable: bool, reason: Option<&str>) -> Vec<(&'static str, String)> {
    let mut params = QueryParams::new();
    params.push("enable", enable);
    params.push_opt("reason", reason);
    params.into_pairs()
}

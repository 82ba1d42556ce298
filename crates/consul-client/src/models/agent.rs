//! Agent models: services, members and check/service definitions.

use crate::models::health::CheckStatus;
use consul_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Message for a check definition with no probe.
pub const MISSING_CHECK_PROBE: &str =
    "Required parameter \"args\", \"http\", \"tcp\" or \"ttl\" is missing.";

/// Message for a probing check without an interval.
pub const MISSING_CHECK_INTERVAL: &str = "Required parameter \"interval\" is missing.";

/// A service registered with the local agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AgentService {
    /// Service instance ID
    #[serde(rename = "ID")]
    pub id: String,

    /// Service name
    pub service: String,

    /// Tags
    #[serde(default)]
    pub tags: Option<Vec<String>>,

    /// Key/value metadata
    #[serde(default)]
    pub meta: Option<HashMap<String, String>>,

    /// Port, 0 when unset
    #[serde(default)]
    pub port: u16,

    /// Address, empty when the node address is used
    #[serde(default)]
    pub address: String,

    /// Whether catalog tag updates are allowed
    #[serde(default)]
    pub enable_tag_override: bool,

    /// Datacenter of the instance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datacenter: Option<String>,
}

/// A gossip pool member from `GET /v1/agent/members`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AgentMember {
    /// Node name
    pub name: String,

    /// Gossip address
    pub addr: String,

    /// Gossip port
    pub port: u16,

    /// Serf tags (`role`, `dc`, `build`...)
    #[serde(default)]
    pub tags: HashMap<String, String>,

    /// Serf member status (1 = alive)
    pub status: i32,
}

impl AgentMember {
    /// Returns true if Serf considers the member alive.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.status == 1
    }
}

/// Local agent description from `GET /v1/agent/self`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AgentSelf {
    /// Runtime configuration summary
    pub config: serde_json::Value,

    /// Full debug configuration, when exposed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_config: Option<serde_json::Value>,

    /// Network coordinate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coord: Option<serde_json::Value>,

    /// The agent's own gossip membership
    pub member: AgentMember,

    /// Node metadata
    #[serde(default)]
    pub meta: HashMap<String, String>,
}

/// A health check to register with the local agent.
///
/// One of `args`, `http`, `tcp` or `ttl` must be set; the first three also need an
/// `interval`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CheckDefinition {
    /// Check name
    pub name: String,

    /// Check ID, defaults to the name
    #[serde(rename = "ID", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Operator notes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Command and arguments to execute
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,

    /// URL to GET
    #[serde(rename = "HTTP", skip_serializing_if = "Option::is_none")]
    pub http: Option<String>,

    /// `host:port` to connect to
    #[serde(rename = "TCP", skip_serializing_if = "Option::is_none")]
    pub tcp: Option<String>,

    /// Time-to-live duration (`"15s"`)
    #[serde(rename = "TTL", skip_serializing_if = "Option::is_none")]
    pub ttl: Option<String>,

    /// How often to run the probe (`"10s"`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,

    /// Probe timeout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,

    /// Service to bind the check to
    #[serde(rename = "ServiceID", skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,

    /// Initial status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CheckStatus>,

    /// Deregister the bound service after being critical this long
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deregister_critical_service_after: Option<String>,
}

impl CheckDefinition {
    /// A check with the given name and nothing else.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Run a command.
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Probe a URL.
    #[must_use]
    pub fn with_http(mut self, url: impl Into<String>) -> Self {
        self.http = Some(url.into());
        self
    }

    /// Probe a TCP address.
    #[must_use]
    pub fn with_tcp(mut self, address: impl Into<String>) -> Self {
        self.tcp = Some(address.into());
        self
    }

    /// Use a TTL check.
    #[must_use]
    pub fn with_ttl(mut self, ttl: impl Into<String>) -> Self {
        self.ttl = Some(ttl.into());
        self
    }

    /// Set the probe interval.
    #[must_use]
    pub fn with_interval(mut self, interval: impl Into<String>) -> Self {
        self.interval = Some(interval.into());
        self
    }

    /// Set the probe timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: impl Into<String>) -> Self {
        self.timeout = Some(timeout.into());
        self
    }

    /// Set the check ID.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set notes.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Bind the check to a service.
    #[must_use]
    pub fn with_service_id(mut self, service_id: impl Into<String>) -> Self {
        self.service_id = Some(service_id.into());
        self
    }

    /// Set the initial status.
    #[must_use]
    pub fn with_status(mut self, status: CheckStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Validate the definition before sending it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValidationError`] if the name or probe is missing, or a
    /// probing check has no interval.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::ValidationError(
                "Required parameter \"name\" is missing.".to_string(),
            ));
        }

        let probes = !self.args.is_empty() || self.http.is_some() || self.tcp.is_some();
        if !probes && self.ttl.is_none() {
            return Err(Error::ValidationError(MISSING_CHECK_PROBE.to_string()));
        }
        if probes && self.interval.as_deref().map_or(true, |i| i.trim().is_empty()) {
            return Err(Error::ValidationError(MISSING_CHECK_INTERVAL.to_string()));
        }

        Ok(())
    }
}

/// A service to register with the local agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceDefinition {
    /// Service name
    pub name: String,

    /// Instance ID, defaults to the name
    #[serde(rename = "ID", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Tags
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Address, defaults to the node address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Port
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Key/value metadata
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub meta: HashMap<String, String>,

    /// Allow catalog tag updates by external agents
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub enable_tag_override: bool,

    /// Embedded health check
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check: Option<CheckDefinition>,
}

impl ServiceDefinition {
    /// A service with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the instance ID.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add a tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Set the address.
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Set the port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Add a metadata entry.
    #[must_use]
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// Allow tag override.
    #[must_use]
    pub fn with_tag_override(mut self, enabled: bool) -> Self {
        self.enable_tag_override = enabled;
        self
    }

    /// Attach a health check.
    #[must_use]
    pub fn with_check(mut self, check: CheckDefinition) -> Self {
        self.check = Some(check);
        self
    }

    /// Validate the definition before sending it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValidationError`] if the name is missing or the embedded check
    /// is invalid.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::ValidationError(
                "Required parameter \"name\" is missing.".to_string(),
            ));
        }
        self.check.as_ref().map_or(Ok(()), CheckDefinition::validate)
    }
}

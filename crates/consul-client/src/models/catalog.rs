//! Catalog models.

use crate::models::agent::AgentService;
use crate::models::health::CheckStatus;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A node as listed by the catalog and health endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CatalogNode {
    /// Node UUID, empty for nodes registered without one
    #[serde(rename = "ID", default)]
    pub id: String,

    /// Node name
    pub node: String,

    /// Node address
    pub address: String,

    /// Datacenter
    #[serde(default)]
    pub datacenter: String,

    /// Alternate addresses (`lan`, `wan`...)
    #[serde(default)]
    pub tagged_addresses: Option<HashMap<String, String>>,

    /// Node metadata
    #[serde(default)]
    pub meta: Option<HashMap<String, String>>,
}

/// A service instance from `GET /v1/catalog/service/{name}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CatalogServiceEntry {
    /// Node UUID
    #[serde(rename = "ID", default)]
    pub id: String,

    /// Node name
    pub node: String,

    /// Node address
    pub address: String,

    /// Datacenter
    #[serde(default)]
    pub datacenter: String,

    /// Node metadata
    #[serde(default)]
    pub node_meta: Option<HashMap<String, String>>,

    /// Service instance ID
    #[serde(rename = "ServiceID")]
    pub service_id: String,

    /// Service name
    pub service_name: String,

    /// Service tags
    #[serde(default)]
    pub service_tags: Vec<String>,

    /// Service address, empty when the node address is used
    #[serde(default)]
    pub service_address: String,

    /// Service port
    #[serde(default)]
    pub service_port: u16,

    /// Service metadata
    #[serde(default)]
    pub service_meta: Option<HashMap<String, String>>,
}

impl CatalogServiceEntry {
    /// Address to reach the service at, falling back to the node address.
    #[must_use]
    pub fn effective_address(&self) -> &str {
        if self.service_address.is_empty() {
            &self.address
        } else {
            &self.service_address
        }
    }
}

/// A node and its services from `GET /v1/catalog/node/{name}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CatalogNodeServices {
    /// The node
    pub node: CatalogNode,
    /// Services keyed by instance ID
    #[serde(default)]
    pub services: HashMap<String, AgentService>,
}

/// Service part of a catalog registration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CatalogService {
    /// Service name
    pub service: String,

    /// Instance ID
    #[serde(rename = "ID", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Tags
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Port
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

impl CatalogService {
    /// A service with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            service: name.into(),
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
}

/// Check part of a catalog registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CatalogCheck {
    /// Check name
    pub name: String,

    /// Check ID
    #[serde(rename = "CheckID", skip_serializing_if = "Option::is_none")]
    pub check_id: Option<String>,

    /// Status
    pub status: CheckStatus,

    /// Notes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Service the check belongs to
    #[serde(rename = "ServiceID", skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
}

impl CatalogCheck {
    /// A check with the given name and status.
    #[must_use]
    pub fn new(name: impl Into<String>, status: CheckStatus) -> Self {
        Self {
            name: name.into(),
            check_id: None,
            status,
            notes: None,
            service_id: None,
        }
    }

    /// Set the check ID.
    #[must_use]
    pub fn with_check_id(mut self, id: impl Into<String>) -> Self {
        self.check_id = Some(id.into());
        self
    }

    /// Set notes.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Bind to a service.
    #[must_use]
    pub fn with_service_id(mut self, id: impl Into<String>) -> Self {
        self.service_id = Some(id.into());
        self
    }
}

/// Body of `PUT /v1/catalog/register`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CatalogRegistration {
    /// Node name
    pub node: String,

    /// Node address
    pub address: String,

    /// Datacenter, defaults to the agent's
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datacenter: Option<String>,

    /// Node UUID
    #[serde(rename = "ID", skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,

    /// Alternate addresses
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub tagged_addresses: HashMap<String, String>,

    /// Node metadata
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub node_meta: HashMap<String, String>,

    /// Service to register on the node
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<CatalogService>,

    /// Check to register on the node
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check: Option<CatalogCheck>,
}

impl CatalogRegistration {
    /// Register `node` at `address`.
    #[must_use]
    pub fn new(node: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            address: address.into(),
            ..Self::default()
        }
    }

    /// Target a datacenter.
    #[must_use]
    pub fn with_datacenter(mut self, datacenter: impl Into<String>) -> Self {
        self.datacenter = Some(datacenter.into());
        self
    }

    /// Add a tagged address.
    #[must_use]
    pub fn with_tagged_address(
        mut self,
        tag: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        self.tagged_addresses.insert(tag.into(), address.into());
        self
    }

    /// Add node metadata.
    #[must_use]
    pub fn with_node_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.node_meta.insert(key.into(), value.into());
        self
    }

    /// Register a service.
    #[must_use]
    pub fn with_service(mut self, service: CatalogService) -> Self {
        self.service = Some(service);
        self
    }

    /// Register a check.
    #[must_use]
    pub fn with_check(mut self, check: CatalogCheck) -> Self {
        self.check = Some(check);
        self
    }
}

/// Body of `PUT /v1/catalog/deregister`.
///
/// Without a check or service ID the whole node is removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CatalogDeregistration {
    /// Node name
    pub node: String,

    /// Datacenter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datacenter: Option<String>,

    /// Only remove this check
    #[serde(rename = "CheckID", skip_serializing_if = "Option::is_none")]
    pub check_id: Option<String>,

    /// Only remove this service
    #[serde(rename = "ServiceID", skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
}

impl CatalogDeregistration {
    /// Remove `node`.
    #[must_use]
    pub fn node(node: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            ..Self::default()
        }
    }

    /// Remove only a check.
    #[must_use]
    pub fn with_check_id(mut self, id: impl Into<String>) -> Self {
        self.check_id = Some(id.into());
        self
    }

    /// Remove only a service.
    #[must_use]
    pub fn with_service_id(mut self, id: impl Into<String>) -> Self {
        self.service_id = Some(id.into());
        self
    }
}

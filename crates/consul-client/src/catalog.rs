//! Catalog endpoints (`/v1/catalog`).

use crate::client::ConsulClient;
use crate::models::catalog::{
    CatalogDeregistration, CatalogNode, CatalogNodeServices, CatalogRegistration,
    CatalogServiceEntry,
};
use crate::Result;
use consul_core::query::QueryParams;
use consul_core::{Error, Outcome};
use reqwest::Method;
use std::collections::HashMap;

/// Handle for the catalog.
#[derive(Clone, Copy)]
pub struct CatalogEndpoint<'a> {
    client: &'a ConsulClient,
}

impl<'a> CatalogEndpoint<'a> {
    pub(crate) const fn new(client: &'a ConsulClient) -> Self {
        Self { client }
    }

    /// Register a node, and optionally a service and check, in the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValidationError`] when the node or address is missing, or an error
    /// if the request fails.
    pub async fn register(&self, registration: &CatalogRegistration) -> Result<Outcome> {
        require_catalog_argument(&registration.node, "node")?;
        require_catalog_argument(&registration.address, "address")?;

        let reply = self
            .client
            .write_json(Method::PUT, "catalog/register", &[], Some(registration))
            .await?;

        let node = &registration.node;
        if reply.is_success() && reply.body.trim() != "false" {
            Ok(Outcome::success(format!(
                "Catalog registration for {node} successful."
            )))
        } else {
            Ok(reply.refused(format!("Catalog registration for {node} failed.")))
        }
    }

    /// Remove a node, or one of its services or checks, from the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValidationError`] when the node is missing, or an error if the
    /// request fails.
    pub async fn deregister(&self, deregistration: &CatalogDeregistration) -> Result<Outcome> {
        require_catalog_argument(&deregistration.node, "node")?;

        let reply = self
            .client
            .write_json(Method::PUT, "catalog/deregister", &[], Some(deregistration))
            .await?;

        let node = &deregistration.node;
        if reply.is_success() && reply.body.trim() != "false" {
            Ok(Outcome::success(format!("Catalog item {node} removed.")))
        } else {
            Ok(reply.refused(format!("Removing Catalog item {node} failed.")))
        }
    }

    /// Known datacenters, nearest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn datacenters(&self) -> Result<Vec<String>> {
        self.client.get_json("catalog/datacenters", &[]).await
    }

    /// Nodes registered in the datacenter.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn nodes(&self) -> Result<Vec<CatalogNode>> {
        self.client.get_json("catalog/nodes", &[]).await
    }

    /// Service names and their tags.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn services(&self) -> Result<HashMap<String, Vec<String>>> {
        self.client.get_json("catalog/services", &[]).await
    }

    /// Instances of a service, optionally filtered by tag.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValidationError`] for an empty service name, or an error if the
    /// request fails.
    pub async fn service(
        &self,
        service: &str,
        tag: Option<&str>,
    ) -> Result<Vec<CatalogServiceEntry>> {
        require_catalog_argument(service, "service")?;

        let mut params = QueryParams::new();
        params.push_opt("tag", tag);
        self.client
            .get_json(&format!("catalog/service/{service}"), &params.into_pairs())
            .await
    }

    /// A node and the services it provides; `None` if the node is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValidationError`] for an empty node name, or an error if the
    /// request fails.
    pub async fn node(&self, node: &str) -> Result<Option<CatalogNodeServices>> {
        require_catalog_argument(node, "node")?;
        self.client
            .get_json(&format!("catalog/node/{node}"), &[])
            .await
    }
}

fn require_catalog_argument(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::ValidationError(format!(
            "Required argument {name} argument is missing."
        )));
    }
    Ok(())
}

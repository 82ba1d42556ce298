//! Raft status endpoints (`/v1/status`).

use crate::client::ConsulClient;
use crate::Result;

/// Handle for Raft status queries.
#[derive(Clone, Copy)]
pub struct StatusEndpoint<'a> {
    client: &'a ConsulClient,
}

impl<'a> StatusEndpoint<'a> {
    pub(crate) const fn new(client: &'a ConsulClient) -> Self {
        Self { client }
    }

    /// Address of the Raft leader, empty when there is none.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn leader(&self) -> Result<String> {
        self.client.get_json("status/leader", &[]).await
    }

    /// Addresses of the Raft peers.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn peers(&self) -> Result<Vec<String>> {
        self.client.get_json("status/peers", &[]).await
    }
}

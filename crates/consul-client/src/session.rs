//! Session endpoints (`/v1/session`).

use crate::client::{require_argument, ConsulClient};
use crate::models::session::{Session, SessionCreated, SessionRequest};
use crate::Result;
use consul_core::ids::SessionId;
use consul_core::Outcome;
use reqwest::Method;

/// Handle for session management.
#[derive(Clone, Copy)]
pub struct SessionEndpoint<'a> {
    client: &'a ConsulClient,
}

impl<'a> SessionEndpoint<'a> {
    pub(crate) const fn new(client: &'a ConsulClient) -> Self {
        Self { client }
    }

    /// Create a session; the outcome carries the new session ID.
    ///
    /// # Errors
    ///
    /// Returns [`consul_core::Error::ValidationError`] for a missing name or a TTL above
    /// one hour, or an error if the request fails.
    pub async fn create(&self, request: &SessionRequest) -> Result<Outcome<SessionId>> {
        request.validate()?;

        let name = &request.name;
        let reply = self
            .client
            .write_json(Method::PUT, "session/create", &[], Some(&request.to_body()))
            .await?;

        if !reply.is_success() {
            return Ok(reply.refused(format!("Unable to create session {name}.")));
        }

        let created: SessionCreated = reply.json()?;
        Ok(Outcome::success(format!("Created session {name}.")).with_data(created.id))
    }

    /// List all active sessions.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list(&self) -> Result<Vec<Session>> {
        self.client.get_json("session/list", &[]).await
    }

    /// List the IDs of all active sessions.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list_ids(&self) -> Result<Vec<SessionId>> {
        Ok(self.list().await?.into_iter().map(|s| s.id).collect())
    }

    /// Sessions bound to a node.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn node(&self, node: &str) -> Result<Vec<Session>> {
        require_argument(node, "node")?;
        self.client
            .get_json(&format!("session/node/{node}"), &[])
            .await
    }

    /// Look up a session; `None` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn info(&self, id: SessionId) -> Result<Option<Session>> {
        let sessions: Option<Vec<Session>> = self
            .client
            .get_json(&format!("session/info/{id}"), &[])
            .await?;
        Ok(sessions.and_then(|s| s.into_iter().next()))
    }

    /// Destroy a session, releasing or deleting its locks.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn destroy(&self, id: SessionId) -> Result<Outcome> {
        let reply = self
            .client
            .write_json::<()>(Method::PUT, &format!("session/destroy/{id}"), &[], None)
            .await?;

        Ok(reply.outcome(
            format!("Destroyed session {id}."),
            format!("Unable to destroy session {id}."),
        ))
    }

    /// Renew a TTL session.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn renew(&self, id: SessionId) -> Result<Outcome<Session>> {
        let reply = self
            .client
            .write_json::<()>(Method::PUT, &format!("session/renew/{id}"), &[], None)
            .await?;

        if !reply.is_success() {
            return Ok(reply.refused(format!("Unable to renew session {id}.")));
        }

        let sessions: Vec<Session> = reply.json()?;
        let outcome = Outcome::success(format!("Renewed session {id}."));
        Ok(match sessions.into_iter().next() {
            Some(session) => outcome.with_data(session),
            None => outcome,
        })
    }
}

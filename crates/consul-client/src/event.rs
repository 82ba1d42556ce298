//! User event endpoints (`/v1/event`).

use crate::client::{require_argument, ConsulClient};
use crate::models::event::{EventFilter, UserEvent};
use crate::Result;
use consul_core::query::QueryParams;
use consul_core::Outcome;
use reqwest::Method;

/// Handle for user events.
#[derive(Clone, Copy)]
pub struct EventEndpoint<'a> {
    client: &'a ConsulClient,
}

impl<'a> EventEndpoint<'a> {
    pub(crate) const fn new(client: &'a ConsulClient) -> Self {
        Self { client }
    }

    /// Fire an event; the outcome carries the event as recorded by the agent.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty name, or an error if the request fails.
    pub async fn fire(
        &self,
        name: &str,
        filter: &EventFilter,
        payload: Option<&[u8]>,
    ) -> Result<Outcome<UserEvent>> {
        require_argument(name, "name")?;

        let reply = self
            .client
            .write(
                Method::PUT,
                &format!("event/fire/{name}"),
                &filter.to_pairs(),
                |request| match payload {
                    Some(bytes) => request.body(bytes.to_vec()),
                    None => request,
                },
            )
            .await?;

        if !reply.is_success() {
            return Ok(reply.refused(format!("Unable to fire event {name}.")));
        }

        let event: UserEvent = reply.json()?;
        Ok(Outcome::success(format!("Event {name} fired.")).with_data(event))
    }

    /// Recent events with the given name.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty name, or an error if the request fails.
    pub async fn list(&self, name: &str) -> Result<Vec<UserEvent>> {
        require_argument(name, "name")?;

        let mut params = QueryParams::new();
        params.push("name", name);
        self.client
            .get_json("event/list", &params.into_pairs())
            .await
    }
}

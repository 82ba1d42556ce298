//! User event models.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use consul_core::ids::EventId;
use consul_core::query::QueryParams;
use consul_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// A user event from `PUT /v1/event/fire/{name}` or `GET /v1/event/list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserEvent {
    /// Event ID
    #[serde(rename = "ID")]
    pub id: EventId,

    /// Event name
    pub name: String,

    /// Base64-encoded payload
    #[serde(default)]
    pub payload: Option<String>,

    /// Node name regex filter
    #[serde(default)]
    pub node_filter: String,

    /// Service name regex filter
    #[serde(default)]
    pub service_filter: String,

    /// Tag regex filter
    #[serde(default)]
    pub tag_filter: String,

    /// Event format version
    #[serde(default)]
    pub version: u32,

    /// Lamport time
    #[serde(rename = "LTime", default)]
    pub ltime: u64,
}

impl UserEvent {
    /// Decode the payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParseError`] if the payload is not valid base64.
    pub fn decoded_payload(&self) -> Result<Option<Vec<u8>>> {
        self.payload
            .as_deref()
            .map(|encoded| STANDARD.decode(encoded).map_err(Error::from))
            .transpose()
    }
}

/// Delivery filters for a fired event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    /// Node name regex
    pub node: Option<String>,
    /// Service name regex
    pub service: Option<String>,
    /// Tag regex, only meaningful with `service`
    pub tag: Option<String>,
}

impl EventFilter {
    /// No filtering.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by node.
    #[must_use]
    pub fn node(mut self, node: impl Into<String>) -> Self {
        self.node = Some(node.into());
        self
    }

    /// Filter by service.
    #[must_use]
    pub fn service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    /// Filter by tag.
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub(crate) fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut params = QueryParams::new();
        params.push_opt("node", self.node.as_deref());
        params.push_opt("service", self.service.as_deref());
        params.push_opt("tag", self.tag.as_deref());
        params.into_pairs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_to_pairs() {
        let filter = EventFilter::new().service("web").tag("v2");
        assert_eq!(
            filter.to_pairs(),
            vec![("service", "web".to_string()), ("tag", "v2".to_string())]
        );
    }

    #[test]
    fn event_decodes_payload() {
        let event: UserEvent = serde_json::from_str(
            r#"{
                "ID": "b54fe110-7af5-cafc-d1fb-afc8ba432b1c",
                "Name": "deploy",
                "Payload": "MQ==",
                "NodeFilter": "",
                "ServiceFilter": "",
                "TagFilter": "",
                "Version": 1,
                "LTime": 0
            }"#,
        )
        .unwrap();
        assert_eq!(event.decoded_payload().unwrap(), Some(b"1".to_vec()));
    }
}

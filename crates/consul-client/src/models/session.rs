//! Session models.

use consul_core::ids::SessionId;
use consul_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Longest TTL accepted when creating a session, in seconds.
pub const MAX_SESSION_TTL_SECS: u64 = 3600;

/// What happens to held locks when a session is invalidated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionBehavior {
    /// Release held locks
    #[default]
    Release,
    /// Delete keys holding locks
    Delete,
}

/// A session as returned by the session endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Session {
    /// Session ID
    #[serde(rename = "ID")]
    pub id: SessionId,

    /// Session name
    #[serde(default)]
    pub name: String,

    /// Node the session is bound to
    pub node: String,

    /// Lock delay in nanoseconds
    #[serde(default)]
    pub lock_delay: u64,

    /// Invalidation behavior
    #[serde(default)]
    pub behavior: SessionBehavior,

    /// TTL as a duration string, empty when unset
    #[serde(rename = "TTL", default)]
    pub ttl: String,

    /// Health checks (older agents)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checks: Option<Vec<String>>,

    /// Node health checks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_checks: Option<Vec<String>>,

    /// Raft index at creation
    #[serde(default)]
    pub create_index: u64,

    /// Raft index of the last modification
    #[serde(default)]
    pub modify_index: u64,
}

/// Parameters for creating a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionRequest {
    /// Session name
    pub name: String,
    /// Node to bind to, defaults to the agent's node
    pub node: Option<String>,
    /// Health checks that invalidate the session
    pub checks: Vec<String>,
    /// Lock delay in seconds
    pub lock_delay_secs: Option<u64>,
    /// Invalidation behavior
    pub behavior: Option<SessionBehavior>,
    /// TTL in seconds, 0..=3600
    pub ttl_secs: Option<u64>,
}

impl SessionRequest {
    /// A session with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Bind to a node.
    #[must_use]
    pub fn with_node(mut self, node: impl Into<String>) -> Self {
        self.node = Some(node.into());
        self
    }

    /// Add a health check.
    #[must_use]
    pub fn with_check(mut self, check: impl Into<String>) -> Self {
        self.checks.push(check.into());
        self
    }

    /// Set the lock delay.
    #[must_use]
    pub fn with_lock_delay(mut self, seconds: u64) -> Self {
        self.lock_delay_secs = Some(seconds);
        self
    }

    /// Set the behavior.
    #[must_use]
    pub fn with_behavior(mut self, behavior: SessionBehavior) -> Self {
        self.behavior = Some(behavior);
        self
    }

    /// Set the TTL.
    #[must_use]
    pub fn with_ttl(mut self, seconds: u64) -> Self {
        self.ttl_secs = Some(seconds);
        self
    }

    /// Validate the request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValidationError`] for a missing name or an out-of-range TTL.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::ValidationError(
                "Required argument \"name\" is missing.".to_string(),
            ));
        }
        if self.ttl_secs.is_some_and(|ttl| ttl > MAX_SESSION_TTL_SECS) {
            return Err(Error::ValidationError(format!(
                "TTL must be between 0 and {MAX_SESSION_TTL_SECS}."
            )));
        }
        Ok(())
    }

    pub(crate) fn to_body(&self) -> SessionCreateBody<'_> {
        SessionCreateBody {
            name: &self.name,
            node: self.node.as_deref(),
            checks: &self.checks,
            lock_delay: self.lock_delay_secs.map(|s| format!("{s}s")),
            behavior: self.behavior,
            ttl: self.ttl_secs.map(|s| format!("{s}s")),
        }
    }
}

/// Wire body of `PUT /v1/session/create`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct SessionCreateBody<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    node: Option<&'a str>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    checks: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    lock_delay: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    behavior: Option<SessionBehavior>,
    #[serde(rename = "TTL", skip_serializing_if = "Option::is_none")]
    ttl: Option<String>,
}

/// Response of `PUT /v1/session/create`.
#[derive(Debug, Deserialize)]
pub(crate) struct SessionCreated {
    #[serde(rename = "ID")]
    pub(crate) id: SessionId,
}

//! Health check models.

use crate::models::agent::AgentService;
use crate::models::catalog::CatalogNode;
use consul_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Message for an unrecognised check status.
pub const INVALID_CHECK_STATUS: &str =
    "Check status must be unknown, passing, warning, or critical.";

/// A health check as reported by the agent and health endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HealthCheck {
    /// Node the check runs on
    #[serde(default)]
    pub node: String,

    /// Check identifier
    #[serde(rename = "CheckID")]
    pub check_id: String,

    /// Human-readable name
    pub name: String,

    /// Current status (`passing`, `warning`, `critical`, `maintenance`)
    pub status: String,

    /// Operator notes
    #[serde(default)]
    pub notes: String,

    /// Output of the last run
    #[serde(default)]
    pub output: String,

    /// Service the check is bound to, empty for node checks
    #[serde(rename = "ServiceID", default)]
    pub service_id: String,

    /// Name of the bound service
    #[serde(default)]
    pub service_name: String,

    /// Tags of the bound service
    #[serde(default)]
    pub service_tags: Vec<String>,

    /// Check type (`http`, `tcp`, `ttl`, `script`...)
    #[serde(rename = "Type", default)]
    pub check_type: String,
}

impl HealthCheck {
    /// Returns true if the check is passing.
    #[must_use]
    pub fn is_passing(&self) -> bool {
        self.status == CheckStatus::Passing.as_str()
    }
}

/// A service instance with its node and checks, from `GET /v1/health/service/{name}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceEntry {
    /// Node hosting the instance
    pub node: CatalogNode,
    /// The service instance
    pub service: AgentService,
    /// Node and service checks
    #[serde(default)]
    pub checks: Vec<HealthCheck>,
}

impl ServiceEntry {
    /// Returns true if every check is passing.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.checks.iter().all(HealthCheck::is_passing)
    }
}

/// Status a check can be registered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    /// Not yet run
    Unknown,
    /// Healthy
    Passing,
    /// Degraded
    Warning,
    /// Failing
    Critical,
}

impl CheckStatus {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Passing => "passing",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "unknown" => Ok(Self::Unknown),
            "passing" => Ok(Self::Passing),
            "warning" => Ok(Self::Warning),
            "critical" => Ok(Self::Critical),
            _ => Err(Error::ValidationError(INVALID_CHECK_STATUS.to_string())),
        }
    }
}

/// State filter for `GET /v1/health/state/{state}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HealthState {
    /// Every check regardless of status
    Any,
    /// Checks that have not run
    Unknown,
    /// Passing checks
    Passing,
    /// Warning checks
    Warning,
    /// Critical checks
    Critical,
}

impl HealthState {
    /// Path segment for the state.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Unknown => "unknown",
            Self::Passing => "passing",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HealthState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "any" => Ok(Self::Any),
            "unknown" => Ok(Self::Unknown),
            "passing" => Ok(Self::Passing),
            "warning" => Ok(Self::Warning),
            "critical" => Ok(Self::Critical),
            _ => Err(Error::ValidationError(
                "State must be any, unknown, passing, warning, or critical.".to_string(),
            )),
        }
    }
}

impl From<CheckStatus> for HealthState {
    fn from(status: CheckStatus) -> Self {
        match status {
            CheckStatus::Unknown => Self::Unknown,
            CheckStatus::Passing => Self::Passing,
            CheckStatus::Warning => Self::Warning,
            CheckStatus::Critical => Self::Critical,
        }
    }
}

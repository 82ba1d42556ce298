//! Results of write operations against Consul.
//!
//! Consul answers most mutating endpoints with an empty body or a bare boolean, so callers
//! mainly care whether the change was applied. [`Outcome`] carries that verdict together
//! with a human-readable message and, where the endpoint returns one, a typed payload.

use crate::{Error, Result};
use serde::Serialize;

/// Success or failure of a write operation, with a human-readable message.
///
/// Serializes as `{"res": bool, "message": "...", "data": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome<T = ()> {
    /// Whether Consul accepted the operation
    #[serde(rename = "res")]
    pub success: bool,

    /// Human-readable description of what happened
    pub message: String,

    /// Payload returned by Consul, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// Consul's response body when the operation was refused
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl<T> Outcome<T> {
    /// A successful outcome.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            detail: None,
        }
    }

    /// A failed outcome.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            detail: None,
        }
    }

    /// Attach a payload.
    #[must_use]
    pub fn with_data(mut self, data: T) -> Self {
        self.data = Some(data);
        self
    }

    /// Attach Consul's error text.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        if !detail.trim().is_empty() {
            self.detail = Some(detail);
        }
        self
    }

    /// Returns true if the operation was applied.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.success
    }

    /// The message describing the outcome.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Consume the outcome and return its payload.
    #[must_use]
    pub fn into_data(self) -> Option<T> {
        self.data
    }

    /// Convert into a `Result`, turning a failure into [`Error::Rejected`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Rejected`] with the outcome message (and Consul's detail, when
    /// present) if the operation failed.
    pub fn into_result(self) -> Result<Option<T>> {
        if self.success {
            return Ok(self.data);
        }

        Err(Error::Rejected(match self.detail {
            Some(detail) => format!("{} ({})", self.message, detail.trim()),
            None => self.message,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_outcome_serializes_as_result_dictionary() {
        let outcome: Outcome = Outcome::success("Deleted key cluster/key.");
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"res": true, "message": "Deleted key cluster/key."})
        );
    }

    #[test]
    fn failure_keeps_detail() {
        let outcome: Outcome<String> =
            Outcome::failure("Unable to create session web.").with_detail("Permission denied");
        assert!(!outcome.is_success());
        assert_eq!(outcome.detail.as_deref(), Some("Permission denied"));

        let err = outcome.into_result().unwrap_err();
        assert_eq!(
            err,
            Error::Rejected("Unable to create session web. (Permission denied)".to_string())
        );
    }

    #[test]
    fn blank_detail_is_ignored() {
        let outcome: Outcome = Outcome::failure("Unable to join the cluster.").with_detail("  ");
        assert!(outcome.detail.is_none());
    }

    #[test]
    fn into_result_returns_data() {
        let outcome = Outcome::success("ACL web created.").with_data(42_u32);
        assert_eq!(outcome.message(), "ACL web created.");
        assert_eq!(outcome.into_result().unwrap(), Some(42));
    }
}

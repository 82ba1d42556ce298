//! Legacy ACL models.

use serde::{Deserialize, Serialize};

/// Legacy ACL token type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AclType {
    /// Restricted by rules
    #[default]
    Client,
    /// Unrestricted
    Management,
}

/// An ACL token as returned by `GET /v1/acl/info/{id}` and `GET /v1/acl/list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AclEntry {
    /// Token ID
    #[serde(rename = "ID")]
    pub id: String,

    /// Human-readable name
    #[serde(default)]
    pub name: String,

    /// Token type
    #[serde(rename = "Type", default)]
    pub acl_type: AclType,

    /// HCL or JSON rules
    #[serde(default)]
    pub rules: String,

    /// Raft index at creation
    #[serde(default)]
    pub create_index: u64,

    /// Raft index of the last modification
    #[serde(default)]
    pub modify_index: u64,
}

/// Parameters for creating or updating an ACL token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AclRequest {
    /// Token name
    pub name: String,

    /// Token type
    #[serde(rename = "Type", skip_serializing_if = "Option::is_none")]
    pub acl_type: Option<AclType>,

    /// Rules
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<String>,

    /// Explicit token ID, on create only
    #[serde(rename = "ID", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl AclRequest {
    /// A token with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the type.
    #[must_use]
    pub fn with_type(mut self, acl_type: AclType) -> Self {
        self.acl_type = Some(acl_type);
        self
    }

    /// Set the rules.
    #[must_use]
    pub fn with_rules(mut self, rules: impl Into<String>) -> Self {
        self.rules = Some(rules.into());
        self
    }

    /// Request a specific token ID.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Response of the create and clone endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct AclIdResponse {
    #[serde(rename = "ID")]
    pub(crate) id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_deserializes_legacy_ids() {
        let entry: AclEntry = serde_json::from_str(
            r#"{"ID": "anonymous", "Name": "Anonymous Token", "Type": "client",
                "Rules": "", "CreateIndex": 4, "ModifyIndex": 4}"#,
        )
        .unwrap();
        assert_eq!(entry.id, "anonymous");
        assert_eq!(entry.acl_type, AclType::Client);
    }

    #[test]
    fn request_skips_unset_fields() {
        let json = serde_json::to_value(AclRequest::new("agent-token").with_type(AclType::Management))
            .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"Name": "agent-token", "Type": "management"})
        );
    }
}

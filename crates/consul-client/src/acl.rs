//! Legacy ACL endpoints (`/v1/acl`).
//!
//! These are the pre-1.4 token endpoints; token IDs are opaque strings such as
//! `anonymous` rather than UUIDs.

use crate::client::{require_argument, ConsulClient};
use crate::models::acl::{AclEntry, AclIdResponse, AclRequest};
use crate::Result;
use consul_core::Outcome;
use reqwest::Method;

/// Handle for legacy ACL management.
#[derive(Clone, Copy)]
pub struct AclEndpoint<'a> {
    client: &'a ConsulClient,
}

impl<'a> AclEndpoint<'a> {
    pub(crate) const fn new(client: &'a ConsulClient) -> Self {
        Self { client }
    }

    /// Create a token; the outcome carries its ID.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty name, or an error if the request fails.
    pub async fn create(&self, request: &AclRequest) -> Result<Outcome<String>> {
        require_argument(&request.name, "name")?;

        let name = &request.name;
        let reply = self
            .client
            .write_json(Method::PUT, "acl/create", &[], Some(request))
            .await?;

        if !reply.is_success() {
            return Ok(reply.refused(format!("Unable to create ACL {name}.")));
        }

        let created: AclIdResponse = reply.json()?;
        Ok(Outcome::success(format!("ACL {name} created.")).with_data(created.id))
    }

    /// Replace the name, type and rules of a token.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty ID or name, or an error if the request
    /// fails.
    pub async fn update(&self, id: &str, request: &AclRequest) -> Result<Outcome> {
        require_argument(id, "id")?;
        require_argument(&request.name, "name")?;

        let body = AclRequest {
            id: Some(id.to_string()),
            ..request.clone()
        };
        let reply = self
            .client
            .write_json(Method::PUT, "acl/update", &[], Some(&body))
            .await?;

        let name = &request.name;
        Ok(reply.outcome(
            format!("ACL {name} updated."),
            format!("Updating ACL {name} failed."),
        ))
    }

    /// Destroy a token.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty ID, or an error if the request fails.
    pub async fn delete(&self, id: &str) -> Result<Outcome> {
        require_argument(id, "id")?;

        let reply = self
            .client
            .write_json::<()>(Method::PUT, &format!("acl/destroy/{id}"), &[], None)
            .await?;

        Ok(reply.outcome(
            format!("ACL {id} deleted."),
            format!("Removing ACL {id} failed."),
        ))
    }

    /// Look up a token; `None` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty ID, or an error if the request fails.
    pub async fn info(&self, id: &str) -> Result<Option<AclEntry>> {
        require_argument(id, "id")?;

        let entries: Option<Vec<AclEntry>> = self
            .client
            .get_json(&format!("acl/info/{id}"), &[])
            .await?;
        Ok(entries.and_then(|e| e.into_iter().next()))
    }

    /// Copy a token; the outcome carries the new ID.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty ID, or an error if the request fails.
    pub async fn clone_token(&self, id: &str) -> Result<Outcome<String>> {
        require_argument(id, "id")?;

        let reply = self
            .client
            .write_json::<()>(Method::PUT, &format!("acl/clone/{id}"), &[], None)
            .await?;

        if !reply.is_success() {
            return Ok(reply.refused(format!("Cloning ACL item {id} failed.")));
        }

        let cloned: AclIdResponse = reply.json()?;
        Ok(Outcome::success(format!("ACL {id} cloned.")).with_data(cloned.id))
    }

    /// All tokens.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list(&self) -> Result<Vec<AclEntry>> {
        self.client.get_json("acl/list", &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::test_client;
    use crate::models::acl::AclType;
    use consul_core::Error;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TOKEN_ID: &str = "adf4238a-882b-9ddc-4a9d-5b6758e4159e";

    #[tokio::test]
    async fn create_returns_id() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/v1/acl/create"))
            .and(body_json(serde_json::json!({
                "Name": "my-app-token",
                "Type": "client",
                "Rules": "key \"\" { policy = \"read\" }"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ID": TOKEN_ID})))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let request = AclRequest::new("my-app-token")
            .with_type(AclType::Client)
            .with_rules("key \"\" { policy = \"read\" }");
        let outcome = client.acl().create(&request).await.unwrap();
        assert_eq!(outcome.message(), "ACL my-app-token created.");
        assert_eq!(outcome.into_data().as_deref(), Some(TOKEN_ID));
    }

    #[tokio::test]
    async fn create_requires_name() {
        let server = MockServer::start().await;
        let client = test_client(&server);
        assert_eq!(
            client.acl().create(&AclRequest::default()).await.unwrap_err(),
            Error::ValidationError("Required argument \"name\" is missing.".to_string())
        );
    }

    #[tokio::test]
    async fn update_sends_id_in_body() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/v1/acl/update"))
            .and(body_json(serde_json::json!({
                "Name": "my-app-token",
                "Type": "management",
                "ID": TOKEN_ID
            })))
            .respond_with(ResponseTemplate::new(403).set_body_string("Permission denied"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let request = AclRequest::new("my-app-token").with_type(AclType::Management);
        let outcome = client.acl().update(TOKEN_ID, &request).await.unwrap();
        assert!(!outcome.is_success());
        assert_eq!(outcome.message(), "Updating ACL my-app-token failed.");
    }

    #[tokio::test]
    async fn delete_clone_and_info() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(format!("/v1/acl/destroy/{TOKEN_ID}")))
            .respond_with(ResponseTemplate::new(200).set_body_string("true"))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path(format!("/v1/acl/clone/{TOKEN_ID}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ID": "8f246b77-f3e1-ff88-5b48-8ec93abf3e05"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/acl/info/anonymous"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
                "ID": "anonymous",
                "Name": "Anonymous Token",
                "Type": "client",
                "Rules": "",
                "CreateIndex": 4,
                "ModifyIndex": 4
            }])))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let acl = client.acl();

        let deleted = acl.delete(TOKEN_ID).await.unwrap();
        assert_eq!(deleted.message(), format!("ACL {TOKEN_ID} deleted."));

        let cloned = acl.clone_token(TOKEN_ID).await.unwrap();
        assert_eq!(cloned.message(), format!("ACL {TOKEN_ID} cloned."));
        assert_eq!(
            cloned.into_data().as_deref(),
            Some("8f246b77-f3e1-ff88-5b48-8ec93abf3e05")
        );

        let info = acl.info("anonymous").await.unwrap().unwrap();
        assert_eq!(info.name, "Anonymous Token");
    }
}

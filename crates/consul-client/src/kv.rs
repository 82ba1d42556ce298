//! Key/value store endpoints (`/v1/kv`).

use crate::client::{require_argument, ConsulClient};
use crate::models::kv::{DeleteOptions, KvPair, PutOptions};
use crate::Result;
use consul_core::ids::SessionId;
use consul_core::query::QueryParams;
use consul_core::{Error, Outcome};
use reqwest::Method;
use tracing::debug;

/// Handle for the key/value store.
#[derive(Clone, Copy)]
pub struct KvEndpoint<'a> {
    client: &'a ConsulClient,
}

impl<'a> KvEndpoint<'a> {
    pub(crate) const fn new(client: &'a ConsulClient) -> Self {
        Self { client }
    }

    /// List key names under a prefix.
    ///
    /// Without `recurse` only one level is listed (`separator=/`). Without a key the whole
    /// store is listed recursively. A missing prefix yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Consul answers with a non-404 failure.
    pub async fn list(&self, key: Option<&str>, recurse: bool) -> Result<Vec<String>> {
        let (path, recurse) = match key.filter(|k| !k.trim().is_empty()) {
            Some(key) => (format!("kv/{key}"), recurse),
            None => ("kv/".to_string(), true),
        };

        let mut params = QueryParams::new();
        params.push_flag("keys", true);
        if !recurse {
            params.push("separator", "/");
        }

        match self
            .client
            .get_optional(&path, &params.into_pairs())
            .await?
        {
            Some(response) => response.json().await.map_err(Error::from),
            None => Ok(Vec::new()),
        }
    }

    /// Fetch a key, or every key under it when `recurse` is set.
    ///
    /// Returns `Ok(None)` when the key does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValidationError`] for an empty key, or an error if the request
    /// fails.
    pub async fn get(&self, key: &str, recurse: bool) -> Result<Option<Vec<KvPair>>> {
        require_argument(key, "key")?;

        let mut params = QueryParams::new();
        params.push_flag("recurse", recurse);

        match self
            .client
            .get_optional(&format!("kv/{key}"), &params.into_pairs())
            .await?
        {
            Some(response) => response.json().await.map(Some).map_err(Error::from),
            None => Ok(None),
        }
    }

    /// Fetch the undecoded value of a single key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValidationError`] for an empty key, or an error if the request
    /// fails.
    pub async fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>> {
        require_argument(key, "key")?;

        let mut params = QueryParams::new();
        params.push_flag("raw", true);

        match self
            .client
            .get_optional(&format!("kv/{key}"), &params.into_pairs())
            .await?
        {
            Some(response) => Ok(Some(response.bytes().await.map_err(Error::from)?.to_vec())),
            None => Ok(None),
        }
    }

    /// Write a value.
    ///
    /// Check-and-set, lock acquisition and release are verified against the current
    /// state before writing. Consul answering `false` counts as a failure.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValidationError`] when the options are inconsistent with each
    /// other or with the key's current state, or an error if a request fails.
    pub async fn put(
        &self,
        key: &str,
        value: impl AsRef<[u8]>,
        options: &PutOptions,
    ) -> Result<Outcome> {
        require_argument(key, "key")?;
        reject_conflicting_options(options)?;

        if let Some(cas) = options.cas {
            self.verify_cas(key, cas).await?;
        }
        if let Some(session) = options.acquire {
            self.verify_session(session).await?;
        }
        if let Some(session) = options.release {
            self.verify_lock_holder(key, session).await?;
        }

        let mut params = QueryParams::new();
        params.push_opt("flags", options.flags);
        params.push_opt("cas", options.cas);
        params.push_opt("acquire", options.acquire);
        params.push_opt("release", options.release);

        let value = value.as_ref();
        let shown = String::from_utf8_lossy(value);
        let body = value.to_vec();
        let reply = self
            .client
            .write(Method::PUT, &format!("kv/{key}"), &params.into_pairs(), |request| {
                request.body(body.clone())
            })
            .await?;

        let failure = format!("Unable to add key {key} with value {shown}.");
        if reply.is_success() && reply.body.trim() != "false" {
            Ok(Outcome::success(format!("Added key {key} with value {shown}.")))
        } else {
            Ok(reply.refused(failure))
        }
    }

    /// Delete a key, or every key under it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValidationError`] for an empty key or a zero CAS index, or an
    /// error if the request fails.
    pub async fn delete(&self, key: &str, options: &DeleteOptions) -> Result<Outcome> {
        require_argument(key, "key")?;
        if options.cas == Some(0) {
            return Err(Error::ValidationError(
                "Check and Set Operation value must be greater than 0.".to_string(),
            ));
        }

        let mut params = QueryParams::new();
        params.push_flag("recurse", options.recurse);
        params.push_opt("cas", options.cas);

        let reply = self
            .client
            .write(
                Method::DELETE,
                &format!("kv/{key}"),
                &params.into_pairs(),
                |request| request,
            )
            .await?;

        if reply.is_success() && reply.body.trim() != "false" {
            Ok(Outcome::success(format!("Deleted key {key}.")))
        } else {
            Ok(reply.refused(format!("Unable to delete key {key}.")))
        }
    }

    async fn current(&self, key: &str) -> Result<Option<KvPair>> {
        Ok(self
            .get(key, false)
            .await?
            .and_then(|pairs| pairs.into_iter().next()))
    }

    async fn verify_cas(&self, key: &str, cas: u64) -> Result<()> {
        let Some(current) = self.current(key).await? else {
            return Err(Error::ValidationError(format!(
                "Key {key} does not exists, CAS argument can not be used."
            )));
        };

        if cas == 0 {
            return Err(Error::ValidationError(format!(
                "Key {key} exists, index must be non-zero."
            )));
        }
        if cas != current.modify_index {
            debug!(key, cas, modify_index = current.modify_index, "CAS index mismatch");
            return Err(Error::ValidationError(format!(
                "Key {key} exists, but indexes do not match."
            )));
        }
        Ok(())
    }

    async fn verify_session(&self, session: SessionId) -> Result<()> {
        let sessions = self.client.session().list_ids().await?;
        if sessions.contains(&session) {
            Ok(())
        } else {
            Err(Error::ValidationError(format!(
                "{session} is not a valid session."
            )))
        }
    }

    async fn verify_lock_holder(&self, key: &str, session: SessionId) -> Result<()> {
        match self.current(key).await?.and_then(|pair| pair.session) {
            Some(holder) if holder == session => Ok(()),
            Some(_) => Err(Error::ValidationError(format!(
                "{key} locked by another session."
            ))),
            None => Err(Error::ValidationError(format!("Key {key} is not locked."))),
        }
    }
}

fn reject_conflicting_options(options: &PutOptions) -> Result<()> {
    let set = [
        ("cas", options.cas.is_some()),
        ("acquire", options.acquire.is_some()),
        ("release", options.release.is_some()),
    ];
    let mut present = set.iter().filter(|(_, on)| *on).map(|(name, _)| *name);

    if let (Some(first), Some(second)) = (present.next(), present.next()) {
        return Err(Error::ValidationError(format!(
            "Using arguments `{first}` and `{second}` together is invalid."
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::test_client;
    use wiremock::matchers::{body_string, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SESSION: &str = "adf4238a-882b-9ddc-4a9d-5b6758e4159e";

    fn pair_json(modify_index: u64, session: Option<&str>) -> serde_json::Value {
        let mut pair = serde_json::json!({
            "LockIndex": 0,
            "Key": "cluster/key",
            "Flags": 0,
            "Value": "dGVzdA==",
            "CreateIndex": 10,
            "ModifyIndex": modify_index
        });
        if let Some(session) = session {
            pair["Session"] = serde_json::json!(session);
        }
        serde_json::json!([pair])
    }

    #[tokio::test]
    async fn empty_key_is_rejected_without_request() {
        let server = MockServer::start().await;
        let client = test_client(&server);

        let err = client.kv().get("", false).await.unwrap_err();
        assert_eq!(
            err,
            Error::ValidationError("Required argument \"key\" is missing.".to_string())
        );
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn get_returns_pairs() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/kv/cluster/key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(pair_json(200, None)))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let pairs = client.kv().get("cluster/key", false).await.unwrap().unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].value_str().unwrap().as_deref(), Some("test"));
    }

    #[tokio::test]
    async fn get_missing_key_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/kv/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = test_client(&server);
        assert_eq!(client.kv().get("missing", false).await.unwrap(), None);
    }

    #[tokio::test]
    async fn get_recurse_sets_flag() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/kv/cluster"))
            .and(query_param("recurse", ""))
            .respond_with(ResponseTemplate::new(200).set_body_json(pair_json(1, None)))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        assert!(client.kv().get("cluster", true).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn get_raw_returns_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/kv/cluster/key"))
            .and(query_param("raw", ""))
            .respond_with(ResponseTemplate::new(200).set_body_string("test"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let raw = client.kv().get_raw("cluster/key").await.unwrap();
        assert_eq!(raw, Some(b"test".to_vec()));
    }

    #[tokio::test]
    async fn list_one_level_uses_separator() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/kv/web"))
            .and(query_param("keys", ""))
            .and(query_param("separator", "/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(["web/bar", "web/foo/"]),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let keys = client.kv().list(Some("web"), false).await.unwrap();
        assert_eq!(keys, vec!["web/bar".to_string(), "web/foo/".to_string()]);
    }

    #[tokio::test]
    async fn list_without_key_walks_the_store() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/kv/"))
            .and(query_param("keys", ""))
            .respond_with(ResponseTemplate::new(200).set_body_json(["a", "b/c"]))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let keys = client.kv().list(None, false).await.unwrap();
        assert_eq!(keys.len(), 2);

        let requests = server.received_requests().await.unwrap();
        assert!(!requests[0].url.query().unwrap_or("").contains("separator"));
    }

    #[tokio::test]
    async fn put_sends_value_and_reports_success() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/v1/kv/cluster/key"))
            .and(query_param("flags", "42"))
            .and(body_string("test"))
            .respond_with(ResponseTemplate::new(200).set_body_string("true"))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let outcome = client
            .kv()
            .put("cluster/key", "test", &PutOptions::new().with_flags(42))
            .await
            .unwrap();
        assert!(outcome.is_success());
        assert_eq!(outcome.message(), "Added key cluster/key with value test.");
    }

    #[tokio::test]
    async fn put_false_body_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/v1/kv/cluster/key"))
            .respond_with(ResponseTemplate::new(200).set_body_string("false"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let outcome = client
            .kv()
            .put("cluster/key", "test", &PutOptions::default())
            .await
            .unwrap();
        assert!(!outcome.is_success());
        assert_eq!(outcome.message(), "Unable to add key cluster/key with value test.");
    }

    #[tokio::test]
    async fn put_rejects_conflicting_options() {
        let server = MockServer::start().await;
        let client = test_client(&server);
        let session = SessionId::parse_str(SESSION).unwrap();

        let err = client
            .kv()
            .put(
                "cluster/key",
                "test",
                &PutOptions::new().with_cas(1).with_acquire(session),
            )
            .await
            .unwrap_err();
        assert_eq!(
            err,
            Error::ValidationError(
                "Using arguments `cas` and `acquire` together is invalid.".to_string()
            )
        );

        let err = client
            .kv()
            .put(
                "cluster/key",
                "test",
                &PutOptions::new().with_acquire(session).with_release(session),
            )
            .await
            .unwrap_err();
        assert_eq!(
            err,
            Error::ValidationError(
                "Using arguments `acquire` and `release` together is invalid.".to_string()
            )
        );
    }

    #[tokio::test]
    async fn put_cas_on_missing_key_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/kv/cluster/key"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client
            .kv()
            .put("cluster/key", "test", &PutOptions::new().with_cas(5))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            Error::ValidationError(
                "Key cluster/key does not exists, CAS argument can not be used.".to_string()
            )
        );
    }

    #[tokio::test]
    async fn put_cas_checks_index() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/kv/cluster/key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(pair_json(200, None)))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/v1/kv/cluster/key"))
            .and(query_param("cas", "200"))
            .respond_with(ResponseTemplate::new(200).set_body_string("true"))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let kv = client.kv();

        let err = kv
            .put("cluster/key", "test", &PutOptions::new().with_cas(0))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            Error::ValidationError("Key cluster/key exists, index must be non-zero.".to_string())
        );

        let err = kv
            .put("cluster/key", "test", &PutOptions::new().with_cas(199))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            Error::ValidationError("Key cluster/key exists, but indexes do not match.".to_string())
        );

        let outcome = kv
            .put("cluster/key", "test", &PutOptions::new().with_cas(200))
            .await
            .unwrap();
        assert!(outcome.is_success());
    }

    #[tokio::test]
    async fn put_acquire_requires_known_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/session/list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let session = SessionId::parse_str(SESSION).unwrap();
        let err = client
            .kv()
            .put("cluster/key", "test", &PutOptions::new().with_acquire(session))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            Error::ValidationError(format!("{SESSION} is not a valid session."))
        );
    }

    #[tokio::test]
    async fn put_acquire_with_valid_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/session/list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
                "ID": SESSION,
                "Name": "lock",
                "Node": "node1",
                "Behavior": "release",
                "TTL": ""
            }])))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/v1/kv/cluster/key"))
            .and(query_param("acquire", SESSION))
            .respond_with(ResponseTemplate::new(200).set_body_string("true"))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let session = SessionId::parse_str(SESSION).unwrap();
        let outcome = client
            .kv()
            .put("cluster/key", "test", &PutOptions::new().with_acquire(session))
            .await
            .unwrap();
        assert!(outcome.is_success());
    }

    #[tokio::test]
    async fn put_release_requires_lock_holder() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/kv/cluster/key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(pair_json(
                3,
                Some("11111111-2222-3333-4444-555555555555"),
            )))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let session = SessionId::parse_str(SESSION).unwrap();
        let err = client
            .kv()
            .put("cluster/key", "test", &PutOptions::new().with_release(session))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            Error::ValidationError("cluster/key locked by another session.".to_string())
        );
    }

    #[tokio::test]
    async fn put_release_of_unlocked_key_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/kv/cluster/key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(pair_json(3, None)))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/v1/kv/cluster/key"))
            .respond_with(ResponseTemplate::new(200).set_body_string("true"))
            .expect(0)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let session = SessionId::parse_str(SESSION).unwrap();
        let err = client
            .kv()
            .put("cluster/key", "test", &PutOptions::new().with_release(session))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            Error::ValidationError("Key cluster/key is not locked.".to_string())
        );
    }

    #[tokio::test]
    async fn delete_reports_outcome() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/v1/kv/cluster/key"))
            .and(query_param("recurse", ""))
            .respond_with(ResponseTemplate::new(200).set_body_string("true"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let outcome = client
            .kv()
            .delete("cluster/key", &DeleteOptions::new().recursive())
            .await
            .unwrap();
        assert!(outcome.is_success());
        assert_eq!(outcome.message(), "Deleted key cluster/key.");
    }

    #[tokio::test]
    async fn delete_failure_keeps_consul_detail() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/v1/kv/cluster/key"))
            .respond_with(ResponseTemplate::new(403).set_body_string("Permission denied"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let outcome = client
            .kv()
            .delete("cluster/key", &DeleteOptions::default())
            .await
            .unwrap();
        assert!(!outcome.is_success());
        assert_eq!(outcome.message(), "Unable to delete key cluster/key.");
        assert_eq!(outcome.detail.as_deref(), Some("Permission denied"));
    }

    #[tokio::test]
    async fn delete_rejects_zero_cas() {
        let server = MockServer::start().await;
        let client = test_client(&server);
        let err = client
            .kv()
            .delete("cluster/key", &DeleteOptions::new().with_cas(0))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            Error::ValidationError(
                "Check and Set Operation value must be greater than 0.".to_string()
            )
        );
    }
}

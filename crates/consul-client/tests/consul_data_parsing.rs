//! Integration tests for parsing Consul data.
//!
//! These tests validate that the consul-client models can deserialize recorded
//! Consul agent responses.

use consul_client::models::{AgentSelf, CatalogNodeServices, KvPair, ServiceEntry};
use consul_client::SessionId;
use std::fs;
use std::path::PathBuf;

/// Get the path to the test fixtures directory.
fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn load_fixture(name: &str) -> String {
    let fixture_path = fixtures_dir().join(name);
    fs::read_to_string(&fixture_path).unwrap_or_else(|e| {
        panic!(
            "Failed to read fixture at {}: {}",
            fixture_path.display(),
            e
        )
    })
}

#[test]
fn test_deserialize_health_service() {
    let json_data = load_fixture("health_service_redis.json");

    let entries: Vec<ServiceEntry> = serde_json::from_str(&json_data)
        .unwrap_or_else(|e| panic!("Failed to deserialize health data: {}\nJSON: {}", e, json_data));

    assert_eq!(entries.len(), 2, "Expected 2 redis instances in test data");

    let primary = &entries[0];
    assert_eq!(primary.node.node, "foobar");
    assert_eq!(primary.service.port, 8000);
    assert_eq!(primary.checks.len(), 2);
    assert_eq!(primary.checks[0].check_type, "tcp");
    assert!(primary.is_healthy());

    let tagged = primary.node.tagged_addresses.as_ref().unwrap();
    assert_eq!(tagged["wan"], "10.1.10.12");
}

#[test]
fn test_health_service_with_failing_replica() {
    let json_data = load_fixture("health_service_redis.json");
    let entries: Vec<ServiceEntry> = serde_json::from_str(&json_data).unwrap();

    let replica = entries
        .iter()
        .find(|entry| entry.service.id == "redis-replica")
        .expect("Should have the replica instance");

    assert!(!replica.is_healthy());
    assert!(replica.node.id.is_empty());
    assert!(replica.node.meta.is_none());
    assert!(replica.service.tags.is_none());
    assert!(replica.service.address.is_empty());
}

#[test]
fn test_deserialize_catalog_node() {
    let json_data = load_fixture("catalog_node.json");
    let node: CatalogNodeServices = serde_json::from_str(&json_data).unwrap();

    assert_eq!(node.node.datacenter, "dc1");
    assert_eq!(node.services.len(), 2);
    assert_eq!(node.services["consul"].port, 8300);
    assert_eq!(
        node.services["redis"].tags.as_deref(),
        Some(&["v1".to_string()][..])
    );
}

#[test]
fn test_deserialize_agent_self() {
    let json_data = load_fixture("agent_self.json");
    let agent: AgentSelf = serde_json::from_str(&json_data).unwrap();

    assert_eq!(agent.config["NodeName"], "foobar");
    assert_eq!(agent.config["Server"], true);
    assert!(agent.member.is_alive());
    assert_eq!(agent.member.tags["role"], "consul");
    assert_eq!(agent.meta["os_version"], "ubuntu_16.04");
    assert!(agent.debug_config.is_none());
}

#[test]
fn test_deserialize_kv_recurse() {
    let json_data = load_fixture("kv_recurse.json");
    let pairs: Vec<KvPair> = serde_json::from_str(&json_data).unwrap();

    assert_eq!(pairs.len(), 3);
    assert_eq!(pairs[0].value_str().unwrap().as_deref(), Some("8080"));

    let leader = pairs
        .iter()
        .find(|pair| pair.key == "web/leader")
        .expect("Should have the leader key");
    assert_eq!(leader.flags, 42);
    assert_eq!(
        leader.session,
        Some(SessionId::parse_str("adf4238a-882b-9ddc-4a9d-5b6758e4159e").unwrap())
    );
    assert_eq!(leader.value_str().unwrap().as_deref(), Some("node-1"));

    let folder = pairs.iter().find(|pair| pair.key.ends_with('/')).unwrap();
    assert_eq!(folder.decoded_value().unwrap(), None);
}

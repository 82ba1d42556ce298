//! Data models for the Consul HTTP API.
//!
//! Response types mirror Consul's PascalCase JSON. Request types are plain Rust structs
//! with builder methods; each endpoint module converts them to the wire shape.

pub mod acl;
pub mod agent;
pub mod catalog;
pub mod event;
pub mod health;
pub mod kv;
pub mod session;

pub use acl::{AclEntry, AclRequest, AclType};
pub use agent::{AgentMember, AgentSelf, AgentService, CheckDefinition, ServiceDefinition};
pub use catalog::{
    CatalogCheck, CatalogDeregistration, CatalogNode, CatalogNodeServices, CatalogRegistration,
    CatalogService, CatalogServiceEntry,
};
pub use event::{EventFilter, UserEvent};
pub use health::{CheckStatus, HealthCheck, HealthState, ServiceEntry};
pub use kv::{DeleteOptions, KvPair, PutOptions};
pub use session::{Session, SessionBehavior, SessionRequest};

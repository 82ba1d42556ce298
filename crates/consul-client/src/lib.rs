//! Consul HTTP API client.
//!
//! Provides typed models and an asynchronous client for the Consul agent's HTTP API:
//! key/value store, agent, sessions, catalog, health, status, legacy ACLs and user events.
//!
//! ```no_run
//! # async fn demo() -> consul_client::Result<()> {
//! use consul_client::{ConsulClient, ConsulConfig};
//!
//! let client = ConsulClient::new(ConsulConfig::from_env()?)?;
//! let leader = client.status().leader().await?;
//! let outcome = client.kv().put("cluster/leader", leader.as_bytes(), &Default::default()).await?;
//! assert!(outcome.is_success());
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]

pub mod acl;
pub mod agent;
pub mod catalog;
pub mod client;
pub mod event;
pub mod health;
pub mod kv;
pub mod models;
pub mod session;
pub mod status;

pub use client::{ConsulClient, ConsulClientBuilder};
pub use consul_core::config::ConsulConfig;
pub use consul_core::ids::{EventId, SessionId};
pub use consul_core::{Error, Outcome};
pub use models::*;

/// Convenient result alias that reuses the shared Consul error type.
pub type Result<T> = consul_core::Result<T>;

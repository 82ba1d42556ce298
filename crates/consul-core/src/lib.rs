//! # consul-core
//!
//! Core types and utilities for talking to the Consul HTTP API.
//!
//! This crate provides the shared error type, client configuration, HTTP execution with
//! retries, and the [`Outcome`] type returned by write operations.
//!
//! ## Modules
//!
//! - [`error`] - Error types and HTTP status code mapping
//! - [`config`] - Configuration for Consul clients (URL, token, TLS, timeouts)
//! - [`client`] - HTTP client construction and retry logic
//! - [`ids`] - Strongly-typed UUID wrappers for Consul resources
//! - [`outcome`] - Success/failure results of write operations
//! - [`query`] - Query parameter builder

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod error;
pub mod ids;
pub mod outcome;
pub mod query;

// Re-export commonly used types
pub use error::{Error, Result};
pub use outcome::Outcome;

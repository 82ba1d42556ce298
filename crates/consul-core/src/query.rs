//! Query string assembly for Consul endpoints.
//!
//! Consul mixes ordinary `key=value` parameters with value-less flags such as `?recurse`
//! or `?keys`; flags are sent as `key=` which the agent treats the same way.

use std::fmt::Display;

/// Ordered list of query parameters for a single request.
#[derive(Debug, Default, Clone)]
pub struct QueryParams {
    pairs: Vec<(&'static str, String)>,
}

impl QueryParams {
    /// Create an empty parameter list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `key=value`.
    pub fn push(&mut self, key: &'static str, value: impl Display) {
        self.pairs.push((key, value.to_string()));
    }

    /// Append `key=value` only when a value is given.
    pub fn push_opt(&mut self, key: &'static str, value: Option<impl Display>) {
        if let Some(value) = value {
            self.push(key, value);
        }
    }

    /// Append the flag `key` when `enabled`.
    pub fn push_flag(&mut self, key: &'static str, enabled: bool) {
        if enabled {
            self.pairs.push((key, String::new()));
        }
    }

    /// Hand the pairs to the request builder.
    #[must_use]
    pub fn into_pairs(self) -> Vec<(&'static str, String)> {
        self.pairs
    }
}

//! Strongly-typed UUID wrappers for Consul resources.
//!
//! Sessions and user events are identified by UUIDs. Wrapping them keeps a session ID
//! from being passed where an event ID is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Declares an opaque UUID-backed identifier as Consul hands it out.
macro_rules! consul_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Parses an identifier returned by the agent.
            ///
            /// # Errors
            ///
            /// Returns [`Error::InvalidId`] if the string is not a UUID.
            pub fn parse_str(input: &str) -> Result<Self> {
                Uuid::parse_str(input.trim())
                    .map(Self)
                    .map_err(|_| Error::InvalidId(input.to_string()))
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                Self::parse_str(s)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0.hyphenated(), f)
            }
        }
    };
}

consul_id!(SessionId, "Session ID, as returned by `session/create`.");
consul_id!(EventId, "User event ID, as returned by `event/fire`.");

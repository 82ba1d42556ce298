//! Key/value store models.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use consul_core::ids::SessionId;
use consul_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// A key/value entry as returned by `GET /v1/kv/{key}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct KvPair {
    /// Full key path
    pub key: String,

    /// Base64-encoded value; `None` for keys created without a value
    #[serde(default)]
    pub value: Option<String>,

    /// Opaque flags attached by the writer
    #[serde(default)]
    pub flags: u64,

    /// Number of times the lock on this key has been acquired
    #[serde(default)]
    pub lock_index: u64,

    /// Session currently holding the lock, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionId>,

    /// Raft index at creation
    #[serde(default)]
    pub create_index: u64,

    /// Raft index of the last modification, used for check-and-set
    #[serde(default)]
    pub modify_index: u64,
}

impl KvPair {
    /// Decode the base64 value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParseError`] if the value is not valid base64.
    pub fn decoded_value(&self) -> Result<Option<Vec<u8>>> {
        self.value
            .as_deref()
            .map(|encoded| STANDARD.decode(encoded).map_err(Error::from))
            .transpose()
    }

    /// Decode the value as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParseError`] if the value is not base64 or not UTF-8.
    pub fn value_str(&self) -> Result<Option<String>> {
        self.decoded_value()?
            .map(|bytes| {
                String::from_utf8(bytes).map_err(|err| {
                    Error::ParseError(format!("value of {} is not UTF-8: {err}", self.key))
                })
            })
            .transpose()
    }
}

/// Options for [`crate::kv::KvEndpoint::put`].
///
/// `cas`, `acquire` and `release` are mutually exclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutOptions {
    /// Opaque flags stored with the key
    pub flags: Option<u64>,
    /// Check-and-set: only write if the key's `ModifyIndex` matches
    pub cas: Option<u64>,
    /// Acquire the key's lock for this session
    pub acquire: Option<SessionId>,
    /// Release the key's lock held by this session
    pub release: Option<SessionId>,
}

impl PutOptions {
    /// Empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set flags.
    #[must_use]
    pub const fn with_flags(mut self, flags: u64) -> Self {
        self.flags = Some(flags);
        self
    }

    /// Set the check-and-set index.
    #[must_use]
    pub const fn with_cas(mut self, index: u64) -> Self {
        self.cas = Some(index);
        self
    }

    /// Acquire the lock for a session.
    #[must_use]
    pub const fn with_acquire(mut self, session: SessionId) -> Self {
        self.acquire = Some(session);
        self
    }

    /// Release the lock held by a session.
    #[must_use]
    pub const fn with_release(mut self, session: SessionId) -> Self {
        self.release = Some(session);
        self
    }
}

/// Options for [`crate::kv::KvEndpoint::delete`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteOptions {
    /// Delete every key under the prefix
    pub recurse: bool,
    /// Only delete if the key's `ModifyIndex` matches; must be non-zero
    pub cas: Option<u64>,
}

impl DeleteOptions {
    /// Empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delete the whole prefix.
    #[must_use]
    pub const fn recursive(mut self) -> Self {
        self.recurse = true;
        self
    }

    /// Set the check-and-set index.
    #[must_use]
    pub const fn with_cas(mut self, index: u64) -> Self {
        self.cas = Some(index);
        self
    }
}

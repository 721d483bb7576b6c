//! Small domain newtypes shared across the adapter.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::phone::PhoneNumber;

/// Opaque provider-issued continuation handle for an in-flight login
/// attempt. The core stores and forwards it; only the gateway that issued it
/// knows what is behind it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PendingHandle(pub String);

/// Provider message id returned by a successful send.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub i32);

/// Serialized provider credentials.
///
/// Only the session store reads or writes these bytes durably, and only the
/// gateway deserializes them; every other component passes the blob through
/// untouched.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionBlob(Vec<u8>);

impl SessionBlob {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Debug elides the credential bytes so they cannot leak into logs.
impl fmt::Debug for SessionBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionBlob({} bytes)", self.0.len())
    }
}

/// Who signed in, as reported by the provider after authentication.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserInfo {
    pub account_identifier: PhoneNumber,
    pub display_name: Option<String>,
}

//! The `Identity` newtype, the opaque string naming a user.
//!
//! Identities are issued by the external authenticator and are referenced
//! by value everywhere: channel keys, relationship sets, message endpoints.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique, opaque user identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Wrap an identity string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Return the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Whether the identity is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Identity {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<Identity> for String {
    fn from(id: Identity) -> String {
        id.0
    }
}

impl AsRef<str> for Identity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Identity {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Identity {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Identity {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

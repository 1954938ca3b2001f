/*
 * Responsibility
 * - Identity returned by the session-state service (username / role / authenticationSource)
 * - Wire shape is fixed by the session service: camelCase keys, nested objects
 * - These values are immutable once decoded; nothing in this crate mutates them
 */
use std::fmt;

use serde::{Deserialize, Serialize};

/// A role name. Equality is plain name equality (no hierarchy).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
}

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Upstream identity provider that issued the session (ldap, oidc, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationSource {
    pub provider: String,
}

impl AuthenticationSource {
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
        }
    }
}

/// Verified identity for a single request.
///
/// All three fields are required on the wire. A body missing any of them is a
/// decode failure, never a partially filled `Identity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub username: String,
    pub role: Role,
    pub authentication_source: AuthenticationSource,
}

impl Identity {
    pub fn new(
        username: impl Into<String>,
        role: Role,
        authentication_source: AuthenticationSource,
    ) -> Self {
        Self {
            username: username.into(),
            role,
            authentication_source,
        }
    }
}

/// Opaque session cookie as received from the caller.
///
/// The value is forwarded as-is and never inspected. `Debug` is redacted so the
/// value cannot leak through `tracing` fields.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCookie {
    name: String,
    value: String,
}

impl SessionCookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// `name=value` pair for an outbound `Cookie` header.
    pub fn to_header_pair(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

impl fmt::Debug for SessionCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCookie")
            .field("name", &self.name)
            .field("value", &"<redacted>")
            .finish()
    }
}

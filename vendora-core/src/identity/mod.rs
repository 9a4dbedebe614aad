//! Account records and the identity-lookup port.
//!
//! The login core only ever reads accounts. Creation, uniqueness of emails and
//! deletion belong to account-management flows that live elsewhere; the port
//! here is the single seam through which the core sees stored identities.

mod memory;
#[cfg(feature = "database")]
mod postgres;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use memory::InMemoryIdentityStore;
#[cfg(feature = "database")]
pub use postgres::PostgresIdentityStore;

/// Canonical form of a login identifier.
///
/// Every path that resolves an account must go through this function, since
/// it decides which stored record an identifier matches.
pub fn normalize_identifier(identifier: &str) -> String {
    identifier.to_lowercase()
}

/// Opaque account identifier as stored by the identity store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Role/permission tag carried into session claims (e.g. `vendor`, `admin`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    pub fn new(role: impl Into<String>) -> Self {
        Self(role.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A registered user as returned by the identity store.
#[derive(Clone, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    /// Lowercased email; the lookup key.
    pub email: String,
    /// Argon2id PHC string. Never the plaintext password.
    pub password_hash: String,
    pub role: Role,
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}

/// Failures raised by identity-store adapters.
#[derive(Debug, Error)]
pub enum IdentityStoreError {
    #[error("identity store unavailable: {0}")]
    Unavailable(String),
    #[error("identity store returned a malformed record: {0}")]
    Corrupt(String),
}

/// Read-only access to stored accounts.
#[async_trait]
pub trait IdentityLookup: Send + Sync + fmt::Debug {
    /// Exact match against an identifier that has already been passed through
    /// [`normalize_identifier`]. Implementations must not re-normalize.
    async fn find_by_normalized_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<Account>, IdentityStoreError>;
}

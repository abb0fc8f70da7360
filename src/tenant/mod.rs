//! Tenant-aware connection routing: identifiers, credentials, the pool cache, the
//! per-task tenant context, resolvers, and the router that ties them together.

pub mod cache;
pub mod connector;
pub mod context;
pub mod resolver;
pub mod router;

pub use cache::PoolCache;
pub use connector::{Connector, PgConnector};
pub use resolver::{RegistryResolver, StaticResolver, TenantResolver};
pub use router::TenantRouter;

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Caller-supplied tenant identifier (request header, admin call, or credential file).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    pub fn new(id: impl Into<String>) -> Self {
        TenantId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for TenantId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TenantId {
    fn from(s: &str) -> Self {
        TenantId(s.to_string())
    }
}

impl From<String> for TenantId {
    fn from(s: String) -> Self {
        TenantId(s)
    }
}

/// Credentials for one tenant database. Replaced as a whole when a tenant is re-added.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct ConnectionCredentials {
    pub url: String,
    pub username: String,
    pub password: String,
}

impl ConnectionCredentials {
    pub fn new(url: impl Into<String>, username: impl Into<String>, password: impl Into<String>) -> Self {
        ConnectionCredentials {
            url: url.into(),
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for ConnectionCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionCredentials")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

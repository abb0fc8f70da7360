//! Credential sources consulted on a cache miss.

use crate::config::{load_definitions, LoadFailure, TenantDefinition};
use crate::error::ResolveError;
use crate::store::TenantStore;
use crate::tenant::{ConnectionCredentials, TenantId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;

/// Maps a tenant id to credentials. `Ok(None)` means the tenant does not exist;
/// `Err` means the lookup itself could not be completed.
#[async_trait]
pub trait TenantResolver: Send + Sync {
    async fn resolve(&self, tenant_id: &TenantId) -> Result<Option<ConnectionCredentials>, ResolveError>;

    fn name(&self) -> &'static str;
}

/// In-memory credentials, loaded once at startup.
#[derive(Clone, Debug, Default)]
pub struct StaticResolver {
    by_id: HashMap<TenantId, ConnectionCredentials>,
}

impl StaticResolver {
    pub fn new(definitions: impl IntoIterator<Item = TenantDefinition>) -> Self {
        StaticResolver {
            by_id: definitions.into_iter().map(|d| (d.id, d.credentials)).collect(),
        }
    }

    /// Scan `dir` for credential files. Unreadable or malformed files fail the load;
    /// files with missing fields are skipped with a warning. A missing directory yields
    /// an empty resolver.
    pub async fn from_dir(dir: &Path) -> Result<Self, ResolveError> {
        let mut definitions = Vec::new();
        for (path, result) in load_definitions(dir).await? {
            match result {
                Ok(def) => definitions.push(def),
                Err(LoadFailure::Read(e)) => return Err(e),
                Err(LoadFailure::Invalid(e)) => {
                    tracing::warn!("skipping tenant file {}: {}", path.display(), e);
                }
            }
        }
        tracing::info!("static resolver loaded {} tenant(s) from {}", definitions.len(), dir.display());
        Ok(Self::new(definitions))
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[async_trait]
impl TenantResolver for StaticResolver {
    async fn resolve(&self, tenant_id: &TenantId) -> Result<Option<ConnectionCredentials>, ResolveError> {
        Ok(self.by_id.get(tenant_id).cloned())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

/// Looks tenants up in the durable `_sys_tenants` registry.
#[derive(Clone)]
pub struct RegistryResolver {
    store: TenantStore,
}

impl RegistryResolver {
    pub fn new(store: TenantStore) -> Self {
        RegistryResolver { store }
    }
}

#[async_trait]
impl TenantResolver for RegistryResolver {
    async fn resolve(&self, tenant_id: &TenantId) -> Result<Option<ConnectionCredentials>, ResolveError> {
        let row = self.store.get(tenant_id).await?;
        Ok(row.map(|def| def.credentials))
    }

    fn name(&self) -> &'static str {
        "registry"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_resolver_serves_known_ids_only() {
        let resolver = StaticResolver::new([TenantDefinition {
            id: "acme".into(),
            credentials: ConnectionCredentials::new("db://acme", "u", "p"),
        }]);
        let found = resolver.resolve(&"acme".into()).await.unwrap().unwrap();
        assert_eq!(found.url, "db://acme");
        assert!(resolver.resolve(&"nope".into()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn from_dir_skips_incomplete_and_fails_on_malformed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("acme.json"),
            r#"{"id":"acme","url":"db://acme","username":"u","password":"p"}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("partial.json"), r#"{"id":"partial"}"#).unwrap();
        let resolver = StaticResolver::from_dir(dir.path()).await.unwrap();
        assert_eq!(resolver.len(), 1);

        std::fs::write(dir.path().join("broken.json"), "{").unwrap();
        let err = StaticResolver::from_dir(dir.path()).await.unwrap_err();
        assert!(matches!(err, ResolveError::Parse { .. }));
    }
}

//! In-memory tenant id → validated connection handle map, plus the default handle.
//!
//! Entries live in a sharded `DashMap`: lookups and writes only lock the shard of
//! their own key, and no shard lock is held across a probe or a release.

use crate::error::TenantError;
use crate::tenant::{ConnectionCredentials, Connector, TenantId};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::time::Duration;

pub struct PoolCache<C: Connector> {
    connector: C,
    entries: DashMap<TenantId, C::Handle>,
    default: C::Handle,
    probe_timeout: Duration,
}

impl<C: Connector> PoolCache<C> {
    /// `default` is the fallback handle for work done without a tenant; it is never evicted.
    pub fn new(connector: C, default: C::Handle, probe_timeout: Duration) -> Self {
        PoolCache {
            connector,
            entries: DashMap::new(),
            default,
            probe_timeout,
        }
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    async fn probe(&self, tenant_id: &TenantId, credentials: &ConnectionCredentials) -> Result<C::Handle, TenantError> {
        match tokio::time::timeout(self.probe_timeout, self.connector.connect(credentials)).await {
            Ok(Ok(handle)) => Ok(handle),
            Ok(Err(source)) => Err(TenantError::ConnectFailed {
                tenant: tenant_id.clone(),
                source,
            }),
            Err(_) => Err(TenantError::Timeout {
                tenant: tenant_id.clone(),
                stage: "connection probe",
                after: self.probe_timeout,
            }),
        }
    }

    /// Probe the credentials and install the handle, replacing (and releasing) any prior entry.
    /// On failure the cache is left as it was.
    pub async fn put(&self, tenant_id: TenantId, credentials: &ConnectionCredentials) -> Result<(), TenantError> {
        let handle = self.probe(&tenant_id, credentials).await?;
        let previous = self.entries.insert(tenant_id.clone(), handle);
        if let Some(previous) = previous {
            tracing::debug!(tenant = %tenant_id, "replaced cached pool, releasing previous");
            self.connector.release(previous).await;
        }
        Ok(())
    }

    /// Probe the credentials and install the handle unless another writer got there first,
    /// in which case the fresh handle is released and the installed one returned.
    pub async fn put_if_absent(
        &self,
        tenant_id: TenantId,
        credentials: &ConnectionCredentials,
    ) -> Result<C::Handle, TenantError> {
        let handle = self.probe(&tenant_id, credentials).await?;
        let (installed, discarded) = match self.entries.entry(tenant_id) {
            Entry::Occupied(e) => (e.get().clone(), Some(handle)),
            Entry::Vacant(e) => {
                e.insert(handle.clone());
                (handle, None)
            }
        };
        if let Some(discarded) = discarded {
            tracing::debug!("concurrent resolution already cached a pool, releasing ours");
            self.connector.release(discarded).await;
        }
        Ok(installed)
    }

    pub fn get(&self, tenant_id: &str) -> Option<C::Handle> {
        self.entries.get(tenant_id).map(|e| e.value().clone())
    }

    pub fn contains(&self, tenant_id: &str) -> bool {
        self.entries.contains_key(tenant_id)
    }

    /// Evict an entry. The caller owns the returned handle and should release it.
    pub fn remove(&self, tenant_id: &str) -> Option<C::Handle> {
        self.entries.remove(tenant_id).map(|(_, handle)| handle)
    }

    /// Sorted snapshot of cached tenant ids; the default handle is not listed.
    pub fn list(&self) -> Vec<TenantId> {
        let mut ids: Vec<TenantId> = self.entries.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn default(&self) -> C::Handle {
        self.default.clone()
    }

    pub async fn release(&self, handle: C::Handle) {
        self.connector.release(handle).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tenant::connector::mock::MockConnector;
    use std::sync::Arc;

    fn cache() -> PoolCache<MockConnector> {
        let connector = MockConnector::default();
        let default = connector.handle("db://base");
        PoolCache::new(connector, default, Duration::from_secs(1))
    }

    fn creds(url: &str) -> ConnectionCredentials {
        ConnectionCredentials::new(url, "user", "pass")
    }

    #[tokio::test]
    async fn put_then_get_returns_probed_handle() {
        let cache = cache();
        cache.put("acme".into(), &creds("db://acme")).await.unwrap();
        let handle = cache.get("acme").expect("cached");
        assert_eq!(handle.url, "db://acme");
        assert_ne!(handle, cache.default());
        assert!(cache.contains("acme"));
    }

    #[tokio::test]
    async fn failed_probe_leaves_cache_unchanged() {
        let cache = cache();
        let err = cache.put("acme".into(), &creds("db://unreachable")).await.unwrap_err();
        assert!(matches!(err, TenantError::ConnectFailed { .. }));
        assert!(cache.get("acme").is_none());

        cache.put("acme".into(), &creds("db://acme")).await.unwrap();
        let err = cache.put("acme".into(), &creds("db://unreachable")).await.unwrap_err();
        assert!(matches!(err, TenantError::ConnectFailed { .. }));
        assert_eq!(cache.get("acme").unwrap().url, "db://acme");
    }

    #[tokio::test]
    async fn replacing_an_entry_releases_the_old_handle() {
        let cache = cache();
        cache.put("acme".into(), &creds("db://acme-a")).await.unwrap();
        let first = cache.get("acme").unwrap();
        cache.put("acme".into(), &creds("db://acme-b")).await.unwrap();

        assert_eq!(cache.list(), vec![TenantId::from("acme")]);
        assert_eq!(cache.get("acme").unwrap().url, "db://acme-b");
        assert_eq!(cache.connector().released(), vec![first.id]);
    }

    #[tokio::test]
    async fn remove_absent_is_none() {
        let cache = cache();
        assert!(cache.remove("ghost").is_none());
        cache.put("acme".into(), &creds("db://acme")).await.unwrap();
        assert_eq!(cache.remove("acme").unwrap().url, "db://acme");
        assert!(cache.list().is_empty());
    }

    #[tokio::test]
    async fn list_excludes_default_and_is_sorted() {
        let cache = cache();
        cache.put("globex".into(), &creds("db://globex")).await.unwrap();
        cache.put("acme".into(), &creds("db://acme")).await.unwrap();
        assert_eq!(cache.list(), vec![TenantId::from("acme"), TenantId::from("globex")]);
    }

    #[tokio::test]
    async fn racing_put_if_absent_installs_one_and_releases_the_other() {
        let cache = Arc::new(cache());
        let a = {
            let cache = cache.clone();
            tokio::spawn(async move { cache.put_if_absent("acme".into(), &creds("db://acme")).await })
        };
        let b = {
            let cache = cache.clone();
            tokio::spawn(async move { cache.put_if_absent("acme".into(), &creds("db://acme")).await })
        };
        let a = a.await.unwrap().unwrap();
        let b = b.await.unwrap().unwrap();

        assert_eq!(a, b);
        assert_eq!(cache.get("acme").unwrap(), a);
        let released = cache.connector().released();
        assert_eq!(released.len(), 1);
        assert_ne!(released[0], a.id);
    }

    #[tokio::test]
    async fn slow_probe_times_out_without_caching() {
        let connector = MockConnector::with_delay(Duration::from_millis(200));
        let default = connector.handle("db://base");
        let cache = PoolCache::new(connector, default, Duration::from_millis(20));
        let err = cache.put("acme".into(), &creds("db://acme")).await.unwrap_err();
        assert!(matches!(err, TenantError::Timeout { stage: "connection probe", .. }));
        assert!(cache.get("acme").is_none());
    }
}

//! Routes each data operation to the connection of the tenant active in the current task.

use crate::error::TenantError;
use crate::tenant::{context, ConnectionCredentials, Connector, PoolCache, TenantId, TenantResolver};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub struct TenantRouter<C: Connector> {
    cache: Arc<PoolCache<C>>,
    resolver: Arc<dyn TenantResolver>,
    resolve_timeout: Duration,
}

impl<C: Connector> Clone for TenantRouter<C> {
    fn clone(&self) -> Self {
        TenantRouter {
            cache: self.cache.clone(),
            resolver: self.resolver.clone(),
            resolve_timeout: self.resolve_timeout,
        }
    }
}

impl<C: Connector> TenantRouter<C> {
    /// The resolver is fixed for the router's lifetime.
    pub fn new(cache: Arc<PoolCache<C>>, resolver: Arc<dyn TenantResolver>, resolve_timeout: Duration) -> Self {
        TenantRouter {
            cache,
            resolver,
            resolve_timeout,
        }
    }

    pub fn cache(&self) -> &PoolCache<C> {
        &self.cache
    }

    pub fn resolver_name(&self) -> &'static str {
        self.resolver.name()
    }

    /// Handle for the current tenant, or the default handle when no tenant is set.
    /// A tenant that cannot be resolved or reached is an error, never the default.
    pub async fn resolve_connection(&self) -> Result<C::Handle, TenantError> {
        match context::current() {
            None => Ok(self.cache.default()),
            Some(tenant_id) => self.connection_for(&tenant_id).await,
        }
    }

    /// Cached handle for `tenant_id`, resolving and probing it on first use.
    pub async fn connection_for(&self, tenant_id: &TenantId) -> Result<C::Handle, TenantError> {
        if let Some(handle) = self.cache.get(tenant_id.as_str()) {
            return Ok(handle);
        }
        let credentials = self.resolve_credentials(tenant_id).await?;
        let handle = self.cache.put_if_absent(tenant_id.clone(), &credentials).await?;
        tracing::info!("resolved and cached pool for tenant '{}' via {} resolver", tenant_id, self.resolver.name());
        Ok(handle)
    }

    async fn resolve_credentials(&self, tenant_id: &TenantId) -> Result<ConnectionCredentials, TenantError> {
        match tokio::time::timeout(self.resolve_timeout, self.resolver.resolve(tenant_id)).await {
            Ok(Ok(Some(credentials))) => {
                tracing::debug!("credentials resolved for tenant '{}'", tenant_id);
                Ok(credentials)
            }
            Ok(Ok(None)) => Err(TenantError::NotFound(tenant_id.clone())),
            Ok(Err(source)) => {
                tracing::warn!("could not resolve tenant '{}': {}", tenant_id, source);
                Err(TenantError::ResolutionFailed {
                    tenant: tenant_id.clone(),
                    source,
                })
            }
            Err(_) => Err(TenantError::Timeout {
                tenant: tenant_id.clone(),
                stage: "credential resolution",
                after: self.resolve_timeout,
            }),
        }
    }

    /// Make `tenant_id` the current tenant of this task's context scope. Resolves and caches
    /// the tenant first if needed, so the context never names a tenant that cannot be served.
    pub async fn set_current_tenant(&self, tenant_id: TenantId) -> Result<(), TenantError> {
        if !context::in_scope() {
            return Err(TenantError::NoContextScope);
        }
        if !self.cache.contains(tenant_id.as_str()) {
            self.connection_for(&tenant_id).await?;
        }
        tracing::debug!("tenant '{}' set as current", tenant_id);
        context::set(tenant_id)
    }

    pub fn current_tenant(&self) -> Option<TenantId> {
        context::current()
    }

    /// Run `f` in a fresh context scope with `tenant_id` as the current tenant.
    pub async fn with_tenant<F, T>(&self, tenant_id: TenantId, f: F) -> Result<T, TenantError>
    where
        F: Future<Output = T>,
    {
        context::scope(async move {
            self.set_current_tenant(tenant_id).await?;
            Ok::<T, TenantError>(f.await)
        })
        .await
    }

    /// Validate and install (or replace) a tenant's pool, even if one is already cached.
    pub async fn add_tenant(&self, tenant_id: TenantId, credentials: &ConnectionCredentials) -> Result<(), TenantError> {
        self.cache.put(tenant_id.clone(), credentials).await?;
        tracing::info!("tenant '{}' added", tenant_id);
        Ok(())
    }

    /// Evict a tenant. The returned handle is no longer routed to; pass it to [`release`](Self::release).
    pub fn remove_tenant(&self, tenant_id: &str) -> Option<C::Handle> {
        let removed = self.cache.remove(tenant_id);
        if removed.is_some() {
            tracing::info!("tenant '{}' removed", tenant_id);
        }
        removed
    }

    pub async fn release(&self, handle: C::Handle) {
        self.cache.release(handle).await;
    }

    pub fn list_tenants(&self) -> Vec<TenantId> {
        self.cache.list()
    }

    pub fn default_handle(&self) -> C::Handle {
        self.cache.default()
    }
}

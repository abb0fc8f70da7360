//! Administrative tenant operations: activation, optionally backed by the durable registry.

use crate::config::{TenantDefinition, TenantSpec};
use crate::error::AppError;
use crate::store::TenantStore;
use crate::tenant::{Connector, TenantId, TenantRouter};

pub struct TenantService;

impl TenantService {
    /// Validate and activate a tenant. With a registry, the row is written in the same
    /// transaction as activation and rolled back if the database cannot be reached.
    pub async fn register<C: Connector>(
        router: &TenantRouter<C>,
        registry: Option<&TenantStore>,
        spec: TenantSpec,
    ) -> Result<TenantDefinition, AppError> {
        let def = spec.validate()?;
        match registry {
            None => router.add_tenant(def.id.clone(), &def.credentials).await?,
            Some(store) => {
                let mut tx = store.begin().await?;
                store.upsert(&mut tx, &def).await?;
                router.add_tenant(def.id.clone(), &def.credentials).await?;
                if let Err(e) = tx.commit().await {
                    tracing::error!("registry commit failed for tenant '{}', deactivating", def.id);
                    if let Some(handle) = router.remove_tenant(def.id.as_str()) {
                        router.release(handle).await;
                    }
                    return Err(e.into());
                }
                tracing::info!("tenant '{}' registered", def.id);
            }
        }
        Ok(def)
    }

    /// Evict and release a tenant's pool. Returns whether it was cached.
    pub async fn deactivate<C: Connector>(router: &TenantRouter<C>, tenant_id: &str) -> bool {
        match router.remove_tenant(tenant_id) {
            Some(handle) => {
                router.release(handle).await;
                true
            }
            None => false,
        }
    }

    pub async fn registered(registry: Option<&TenantStore>) -> Result<Vec<TenantId>, AppError> {
        let store = registry.ok_or_else(|| AppError::NotFound("tenant registry is not enabled".into()))?;
        Ok(store.list_ids().await?)
    }
}

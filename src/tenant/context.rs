//! Per-task "current tenant" value.
//!
//! Each request runs inside its own [`scope`]; the value starts unset, is set by the
//! router once the tenant is known to be servable, and disappears with the scope.
//! Tasks spawned from inside a scope do not inherit it.

use crate::error::TenantError;
use crate::tenant::TenantId;
use std::cell::RefCell;
use std::future::Future;

tokio::task_local! {
    static CURRENT_TENANT: RefCell<Option<TenantId>>;
}

/// Run `f` with a fresh, unset tenant context.
pub async fn scope<F: Future>(f: F) -> F::Output {
    CURRENT_TENANT.scope(RefCell::new(None), f).await
}

/// Synchronous counterpart of [`scope`].
pub fn sync_scope<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    CURRENT_TENANT.sync_scope(RefCell::new(None), f)
}

/// Tenant active in the current scope, if any.
pub fn current() -> Option<TenantId> {
    CURRENT_TENANT.try_with(|c| c.borrow().clone()).ok().flatten()
}

pub fn in_scope() -> bool {
    CURRENT_TENANT.try_with(|_| ()).is_ok()
}

pub(crate) fn set(tenant_id: TenantId) -> Result<(), TenantError> {
    CURRENT_TENANT
        .try_with(|c| {
            *c.borrow_mut() = Some(tenant_id);
        })
        .map_err(|_| TenantError::NoContextScope)
}

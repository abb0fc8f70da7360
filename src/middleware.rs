//! Request-entry boundary: every tenant-scoped route runs inside its own tenant context.

use crate::error::{AppError, TenantError};
use crate::extractors::TenantHeader;
use crate::state::AppState;
use crate::tenant::{context, Connector};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::Level;

/// Open a context scope for the request, make the header's tenant current (resolving it
/// on first use), and run the rest of the stack inside that scope.
pub async fn require_tenant<C: Connector>(
    State(state): State<AppState<C>>,
    TenantHeader(tenant_id): TenantHeader,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    context::scope(async move {
        if let Err(e) = state.router.set_current_tenant(tenant_id.clone()).await {
            if failure_level(&e) == Level::ERROR {
                tracing::error!("could not set tenant '{}' for request: {}", tenant_id, e);
            } else {
                tracing::debug!("rejected tenant '{}' for request: {}", tenant_id, e);
            }
            return Err(AppError::from(e));
        }
        Ok(next.run(request).await)
    })
    .await
}

/// Log level for a failed tenant switch: client mistakes stay below error.
fn failure_level(e: &TenantError) -> Level {
    match e {
        TenantError::NotFound(_) | TenantError::InvalidCredentials(_) => Level::DEBUG,
        _ => Level::ERROR,
    }
}

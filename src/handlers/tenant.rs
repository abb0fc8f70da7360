//! Admin handlers: list, add/replace, and evict tenants.

use crate::config::{TenantSpec, TenantSummary};
use crate::error::AppError;
use crate::response::{success_many, success_one_ok};
use crate::service::TenantService;
use crate::state::AppState;
use crate::tenant::Connector;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

/// GET /tenants: ids with a cached pool.
pub async fn list_tenants<C: Connector>(
    State(state): State<AppState<C>>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    Ok(success_many(state.router.list_tenants()))
}

/// POST /tenants: add or replace a tenant; registers it too when the registry is enabled.
pub async fn add_tenant<C: Connector>(
    State(state): State<AppState<C>>,
    Json(body): Json<TenantSpec>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    tracing::info!("received add tenant request for {:?}", body.tenant_id);
    let def = TenantService::register(&state.router, state.registry.as_ref(), body).await?;
    Ok(success_one_ok(TenantSummary::from(&def)))
}

/// DELETE /tenants/:tenant_id: evict and release; succeeds whether or not it was cached.
pub async fn remove_tenant<C: Connector>(
    State(state): State<AppState<C>>,
    Path(tenant_id): Path<String>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    if !TenantService::deactivate(&state.router, &tenant_id).await {
        tracing::debug!("tenant '{}' was not cached", tenant_id);
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /tenants/registered: ids stored in the durable registry.
pub async fn list_registered<C: Connector>(
    State(state): State<AppState<C>>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let ids = TenantService::registered(state.registry.as_ref()).await?;
    Ok(success_many(ids))
}

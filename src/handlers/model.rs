//! Tenant-scoped model handlers. Run behind `require_tenant`, so the router already knows the tenant.

use crate::error::AppError;
use crate::response::{success_many, success_one};
use crate::service::ModelService;
use crate::state::AppState;
use axum::extract::State;

/// GET /models
pub async fn list_models(State(state): State<AppState>) -> Result<impl axum::response::IntoResponse, AppError> {
    let pool = state.router.resolve_connection().await?;
    let rows = ModelService::find_all(&pool).await?;
    Ok(success_many(rows))
}

/// POST /models: creates a record stamped with the current tenant.
pub async fn create_model(State(state): State<AppState>) -> Result<impl axum::response::IntoResponse, AppError> {
    let tenant = state
        .router
        .current_tenant()
        .ok_or_else(|| AppError::BadRequest("X-Tenant-ID header is required".into()))?;
    tracing::info!("creating model for tenant '{}'", tenant);
    let pool = state.router.resolve_connection().await?;
    let row = ModelService::create(&pool, tenant.as_str()).await?;
    Ok(success_one(row))
}

//! Tenant-scoped routes; each request is bound to the tenant named in `X-Tenant-ID`.

use crate::handlers::model::{create_model, list_models};
use crate::middleware::require_tenant;
use crate::state::AppState;
use crate::tenant::PgConnector;
use axum::{middleware::from_fn_with_state, routing::get, Router};

pub fn model_routes(state: AppState) -> Router {
    Router::new()
        .route("/models", get(list_models).post(create_model))
        .route_layer(from_fn_with_state(state.clone(), require_tenant::<PgConnector>))
        .with_state(state)
}

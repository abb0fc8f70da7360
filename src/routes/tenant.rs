//! Admin routes over the tenant pool cache and registry.

use crate::handlers::tenant::{add_tenant, list_registered, list_tenants, remove_tenant};
use crate::state::AppState;
use crate::tenant::Connector;
use axum::{routing::delete, routing::get, Router};

pub fn tenant_routes<C: Connector>(state: AppState<C>) -> Router {
    Router::new()
        .route("/tenants", get(list_tenants::<C>).post(add_tenant::<C>))
        .route("/tenants/registered", get(list_registered::<C>))
        .route("/tenants/:tenant_id", delete(remove_tenant::<C>))
        .with_state(state)
}

//! Shared application state for all routes.

use crate::store::TenantStore;
use crate::tenant::{Connector, PgConnector, TenantRouter};

pub struct AppState<C: Connector = PgConnector> {
    pub router: TenantRouter<C>,
    /// Present when tenants are resolved from (and registered in) the durable registry.
    pub registry: Option<TenantStore>,
}

impl<C: Connector> Clone for AppState<C> {
    fn clone(&self) -> Self {
        AppState {
            router: self.router.clone(),
            registry: self.registry.clone(),
        }
    }
}

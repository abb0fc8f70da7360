//! Tenant router: per-request routing of data access to one PostgreSQL database per tenant.

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod service;
pub mod state;
pub mod store;
pub mod tenant;

pub use config::{load_startup_tenants, ResolverKind, Settings, TenantDefinition, TenantSpec};
pub use error::{AppError, ConfigError, ResolveError, TenantError};
pub use extractors::{TenantHeader, TENANT_ID_HEADER};
pub use middleware::require_tenant;
pub use response::{success_many, success_one, success_one_ok};
pub use routes::{common_routes, common_routes_with_ready, model_routes, tenant_routes};
pub use service::{Model, ModelService, TenantService};
pub use state::AppState;
pub use store::{ensure_database_exists, TenantStore};
pub use tenant::{
    context, ConnectionCredentials, Connector, PgConnector, PoolCache, RegistryResolver, StaticResolver, TenantId,
    TenantResolver, TenantRouter,
};

//! Composition root: builds the default pool, resolver, pool cache and router, loads
//! startup tenants, then serves the tenant admin and tenant-scoped routes.
//!
//! Run from repo root: `cargo run -p tenant-server`

use axum::Router;
use std::sync::Arc;
use tenant_router::{
    common_routes_with_ready, ensure_database_exists, load_startup_tenants, model_routes, tenant_routes, AppState,
    PgConnector, PoolCache, RegistryResolver, ResolverKind, Settings, StaticResolver, TenantResolver, TenantRouter,
    TenantStore,
};
use tokio::net::TcpListener;
use tower_http::limit::RequestBodyLimitLayer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("tenant_router=info,tenant_server=info")),
        )
        .init();

    let settings = Settings::from_env()?;
    ensure_database_exists(&settings.database_url).await?;
    let default_pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.probe_timeout)
        .connect(&settings.database_url)
        .await?;

    let store = TenantStore::new(default_pool.clone(), settings.admin_schema.clone());
    store.ensure_table().await?;

    let resolver: Arc<dyn TenantResolver> = match settings.resolver {
        ResolverKind::Static => Arc::new(StaticResolver::from_dir(&settings.runtime_dir).await?),
        ResolverKind::Registry => Arc::new(RegistryResolver::new(store.clone())),
    };
    let registry = (settings.resolver == ResolverKind::Registry).then_some(store);

    let connector = PgConnector::new(settings.max_connections, settings.probe_timeout);
    let cache = Arc::new(PoolCache::new(connector, default_pool, settings.probe_timeout));
    let router = TenantRouter::new(cache, resolver, settings.resolve_timeout);
    tracing::info!("tenant resolver: {}", router.resolver_name());

    let loaded = load_startup_tenants(&router, &settings.startup_dir).await;
    tracing::info!("{} tenant(s) loaded at startup", loaded);

    let state = AppState { router, registry };
    let app = Router::new()
        .merge(common_routes_with_ready(state.clone()))
        .merge(tenant_routes(state.clone()))
        .merge(model_routes(state))
        .layer(RequestBodyLimitLayer::new(64 * 1024));

    let listener = TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

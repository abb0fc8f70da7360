//! In-memory connector for driving the router without PostgreSQL.
//! URLs containing "unreachable" are refused.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tenant_router::{
    ConnectionCredentials, Connector, PoolCache, StaticResolver, TenantDefinition, TenantResolver, TenantRouter,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FakePool {
    pub id: u64,
    pub url: String,
}

#[derive(Clone, Default)]
pub struct FakeConnector {
    next_id: Arc<AtomicU64>,
    released: Arc<Mutex<Vec<u64>>>,
}

impl FakeConnector {
    pub fn pool(&self, url: &str) -> FakePool {
        FakePool {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            url: url.to_string(),
        }
    }

    pub fn released(&self) -> Vec<u64> {
        self.released.lock().unwrap().clone()
    }
}

#[async_trait]
impl Connector for FakeConnector {
    type Handle = FakePool;

    async fn connect(&self, credentials: &ConnectionCredentials) -> Result<FakePool, sqlx::Error> {
        if credentials.url.contains("unreachable") {
            return Err(sqlx::Error::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            )));
        }
        Ok(self.pool(&credentials.url))
    }

    async fn release(&self, handle: FakePool) {
        self.released.lock().unwrap().push(handle.id);
    }
}

pub fn definition(id: &str, url: &str) -> TenantDefinition {
    TenantDefinition {
        id: id.into(),
        credentials: ConnectionCredentials::new(url, "user", "secret"),
    }
}

pub fn router_with(resolver: Arc<dyn TenantResolver>) -> (TenantRouter<FakeConnector>, FakeConnector) {
    let connector = FakeConnector::default();
    let default = connector.pool("db://base");
    let cache = Arc::new(PoolCache::new(connector.clone(), default, Duration::from_secs(1)));
    (TenantRouter::new(cache, resolver, Duration::from_secs(1)), connector)
}

pub fn static_router(definitions: Vec<TenantDefinition>) -> (TenantRouter<FakeConnector>, FakeConnector) {
    router_with(Arc::new(StaticResolver::new(definitions)))
}

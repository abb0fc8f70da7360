//! Turning credentials into live connection handles.

use crate::tenant::ConnectionCredentials;
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, Connection, PgPool};
use std::str::FromStr;
use std::time::Duration;

/// Opens and releases connection handles. `connect` must only return a handle that
/// has just been proven reachable.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    type Handle: Clone + Send + Sync + 'static;

    /// Open a handle and probe it. The probe connection is closed regardless of outcome.
    async fn connect(&self, credentials: &ConnectionCredentials) -> Result<Self::Handle, sqlx::Error>;

    /// End a handle's lifecycle once it is no longer routed to.
    async fn release(&self, handle: Self::Handle);
}

/// Builds one `PgPool` per tenant.
#[derive(Clone, Debug)]
pub struct PgConnector {
    max_connections: u32,
    acquire_timeout: Duration,
}

impl PgConnector {
    pub fn new(max_connections: u32, acquire_timeout: Duration) -> Self {
        PgConnector {
            max_connections,
            acquire_timeout,
        }
    }
}

impl Default for PgConnector {
    fn default() -> Self {
        PgConnector::new(5, Duration::from_secs(5))
    }
}

#[async_trait]
impl Connector for PgConnector {
    type Handle = PgPool;

    /// Probes with one direct connection so a refused or rejected connection surfaces
    /// its own error instead of a pool acquire timeout. The pool itself starts empty.
    async fn connect(&self, credentials: &ConnectionCredentials) -> Result<PgPool, sqlx::Error> {
        let options = PgConnectOptions::from_str(&credentials.url)?
            .username(&credentials.username)
            .password(&credentials.password);

        let mut conn = options.connect().await?;
        if let Err(e) = conn.ping().await {
            let _ = conn.close().await;
            return Err(e);
        }
        conn.close().await?;

        Ok(PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.acquire_timeout)
            .connect_lazy_with(options))
    }

    /// Waits for checked-out connections to come back before closing.
    async fn release(&self, handle: PgPool) {
        handle.close().await;
    }
}

//! Durable tenant registry: one `_sys_tenants` row per tenant in the base database.
//! The table lives in the admin schema (`ADMIN_SCHEMA`, default `admin`).

use crate::config::TenantDefinition;
use crate::error::AppError;
use crate::tenant::{ConnectionCredentials, TenantId};
use sqlx::ConnectOptions;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use std::str::FromStr;

const TENANTS_TABLE: &str = "_sys_tenants";

#[derive(Clone, Debug)]
pub struct TenantStore {
    pool: PgPool,
    schema: String,
}

impl TenantStore {
    /// `schema` must already be a valid PostgreSQL identifier (see `Settings`).
    pub fn new(pool: PgPool, schema: impl Into<String>) -> Self {
        TenantStore {
            pool,
            schema: schema.into(),
        }
    }

    fn table(&self) -> String {
        format!("{}.{}", quote_ident(&self.schema), TENANTS_TABLE)
    }

    /// Create the admin schema and `_sys_tenants` if they do not exist.
    pub async fn ensure_table(&self) -> Result<(), sqlx::Error> {
        sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", quote_ident(&self.schema)))
            .execute(&self.pool)
            .await?;
        let ddl = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id TEXT PRIMARY KEY,
                url TEXT NOT NULL,
                username TEXT NOT NULL,
                password TEXT NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            self.table()
        );
        sqlx::query(&ddl).execute(&self.pool).await?;
        Ok(())
    }

    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        self.pool.begin().await
    }

    /// Insert or replace one tenant row. Call within a transaction when activation must be atomic with it.
    pub async fn upsert(&self, conn: &mut PgConnection, def: &TenantDefinition) -> Result<(), sqlx::Error> {
        let sql = format!(
            r#"
            INSERT INTO {} (id, url, username, password, updated_at)
            VALUES ($1, $2, $3, $4, NOW())
            ON CONFLICT (id)
            DO UPDATE SET url = $2, username = $3, password = $4, updated_at = NOW()
            "#,
            self.table()
        );
        sqlx::query(&sql)
            .bind(def.id.as_str())
            .bind(&def.credentials.url)
            .bind(&def.credentials.username)
            .bind(&def.credentials.password)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    pub async fn get(&self, tenant_id: &TenantId) -> Result<Option<TenantDefinition>, sqlx::Error> {
        let sql = format!("SELECT id, url, username, password FROM {} WHERE id = $1", self.table());
        let row: Option<(String, String, String, String)> = sqlx::query_as(&sql)
            .bind(tenant_id.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(id, url, username, password)| TenantDefinition {
            id: TenantId::from(id),
            credentials: ConnectionCredentials::new(url, username, password),
        }))
    }

    pub async fn list_ids(&self) -> Result<Vec<TenantId>, sqlx::Error> {
        let sql = format!("SELECT id FROM {} ORDER BY id", self.table());
        let ids: Vec<String> = sqlx::query_scalar(&sql).fetch_all(&self.pool).await?;
        Ok(ids.into_iter().map(TenantId::from).collect())
    }
}

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// default `postgres` database to run CREATE DATABASE. Call before creating the default pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| AppError::BadRequest(format!("invalid DATABASE_URL: {}", e)))?;
    let mut conn: PgConnection = opts.connect().await.map_err(AppError::Db)?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await
        .map_err(AppError::Db)?;
    if !exists.0 {
        tracing::info!("creating database {}", db_name);
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await
            .map_err(AppError::Db)?;
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), AppError> {
    let scheme_end = url.find("://").map(|i| i + 3).unwrap_or(0);
    let path_start = url
        .get(scheme_end..)
        .and_then(|rest| rest.find('/'))
        .map(|i| scheme_end + i + 1)
        .ok_or_else(|| AppError::BadRequest("DATABASE_URL: no path".into()))?;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let (db_name, query) = match path_and_query.split_once('?') {
        Some((name, q)) => (name.trim(), Some(q)),
        None => (path_and_query.trim(), None),
    };
    let base = url.get(..path_start).unwrap_or(url);
    let admin_url = match query {
        Some(q) => format!("{}postgres?{}", base, q),
        None => format!("{}postgres", base),
    };
    Ok((admin_url, db_name.to_string()))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

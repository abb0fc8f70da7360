//! Tenant-scoped `models` records. The pool passed in decides which tenant database is hit.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub tenant: String,
}

pub struct ModelService;

impl ModelService {
    pub async fn find_all(pool: &PgPool) -> Result<Vec<Model>, sqlx::Error> {
        sqlx::query_as::<_, Model>("SELECT id, created_at, tenant FROM models ORDER BY created_at")
            .fetch_all(pool)
            .await
    }

    /// Insert a record stamped with the tenant it was created for.
    pub async fn create(pool: &PgPool, tenant: &str) -> Result<Model, sqlx::Error> {
        let id = uuid::Uuid::new_v4().to_string();
        sqlx::query_as::<_, Model>(
            "INSERT INTO models (id, created_at, tenant) VALUES ($1, NOW(), $2) RETURNING id, created_at, tenant",
        )
        .bind(&id)
        .bind(tenant)
        .fetch_one(pool)
        .await
    }
}

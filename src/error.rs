//! Typed errors and HTTP mapping.

use crate::tenant::TenantId;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing setting: {0}")]
    Missing(&'static str),
    #[error("invalid setting {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
}

/// Failure of a resolver's own lookup, as opposed to "tenant does not exist".
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("registry: {0}")]
    Db(#[from] sqlx::Error),
    #[error("parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors of the tenant routing core.
#[derive(Error, Debug)]
pub enum TenantError {
    #[error("tenant not found: {0}")]
    NotFound(TenantId),
    #[error("could not resolve tenant {tenant}")]
    ResolutionFailed {
        tenant: TenantId,
        #[source]
        source: ResolveError,
    },
    #[error("could not connect to database of tenant {tenant}: {source}")]
    ConnectFailed {
        tenant: TenantId,
        #[source]
        source: sqlx::Error,
    },
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),
    #[error("{stage} for tenant {tenant} timed out after {after:?}")]
    Timeout {
        tenant: TenantId,
        stage: &'static str,
        after: Duration,
    },
    #[error("no tenant context scope is active")]
    NoContextScope,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Tenant(#[from] TenantError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("bad request: {0}")]
    BadRequest(String),
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl TenantError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            TenantError::NotFound(_) => (StatusCode::NOT_FOUND, "tenant_not_found"),
            TenantError::ResolutionFailed { .. } => (StatusCode::SERVICE_UNAVAILABLE, "tenant_resolution_failed"),
            TenantError::ConnectFailed { .. } => (StatusCode::BAD_GATEWAY, "tenant_connect_failed"),
            TenantError::InvalidCredentials(_) => (StatusCode::UNPROCESSABLE_ENTITY, "invalid_credentials"),
            TenantError::Timeout { .. } => (StatusCode::GATEWAY_TIMEOUT, "tenant_timeout"),
            TenantError::NoContextScope => (StatusCode::INTERNAL_SERVER_ERROR, "tenant_context_unavailable"),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            TenantError::ResolutionFailed { source, .. } => Some(serde_json::json!({ "cause": source.to_string() })),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
            AppError::Tenant(e) => e.status_and_code(),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Db(e) => {
                if let sqlx::Error::RowNotFound = e {
                    (StatusCode::NOT_FOUND, "not_found")
                } else {
                    (StatusCode::INTERNAL_SERVER_ERROR, "database_error")
                }
            }
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
        };
        let details = match &self {
            AppError::Tenant(e) => e.details(),
            _ => None,
        };
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
                details,
            },
        };
        (status, Json(body)).into_response()
    }
}

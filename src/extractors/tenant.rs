//! Extract tenant id from request (X-Tenant-ID header).

use crate::error::AppError;
use crate::tenant::TenantId;
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::request::Parts,
};

/// Header name for tenant id.
pub const TENANT_ID_HEADER: &str = "X-Tenant-ID";

/// Required tenant id from the `X-Tenant-ID` header; absent or blank is a 400.
#[derive(Clone, Debug)]
pub struct TenantHeader(pub TenantId);

#[async_trait]
impl<S> FromRequestParts<S> for TenantHeader
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(TENANT_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| TenantHeader(TenantId::from(s)))
            .ok_or_else(|| AppError::BadRequest(format!("{} header is required", TENANT_ID_HEADER)))
    }
}

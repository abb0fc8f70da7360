use crate::tenant::{ConnectionCredentials, TenantId};
use serde::{Deserialize, Serialize};

/// Raw tenant tuple as it arrives from an admin request body or a credential file.
/// Fields stay optional until `TenantSpec::validate` checks them.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantSpec {
    #[serde(alias = "id")]
    pub tenant_id: Option<String>,
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// A validated tenant: id plus the credentials to reach its database.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TenantDefinition {
    pub id: TenantId,
    pub credentials: ConnectionCredentials,
}

/// What admin endpoints echo back; never includes the password.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantSummary {
    pub tenant_id: TenantId,
    pub url: String,
    pub username: String,
}

impl From<&TenantDefinition> for TenantSummary {
    fn from(def: &TenantDefinition) -> Self {
        TenantSummary {
            tenant_id: def.id.clone(),
            url: def.credentials.url.clone(),
            username: def.credentials.username.clone(),
        }
    }
}

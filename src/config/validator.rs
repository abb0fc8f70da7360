//! Tenant tuple validation for the administrative and startup paths.

use crate::config::{TenantDefinition, TenantSpec};
use crate::error::TenantError;
use crate::tenant::{ConnectionCredentials, TenantId};
use regex::Regex;
use std::sync::OnceLock;

fn tenant_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.-]{0,62}$").expect("valid tenant id regex"))
}

pub fn validate_tenant_id(id: &str) -> Result<TenantId, TenantError> {
    if !tenant_id_pattern().is_match(id) {
        return Err(TenantError::InvalidCredentials(format!(
            "invalid tenant id '{}': use letters, digits, '_', '.', '-' (max 63 chars)",
            id
        )));
    }
    Ok(TenantId::from(id))
}

impl TenantSpec {
    /// All four fields are required; id and url must also be non-empty.
    pub fn validate(self) -> Result<TenantDefinition, TenantError> {
        let missing: Vec<&str> = [
            ("tenantId", self.tenant_id.as_deref().map_or(true, |s| s.trim().is_empty())),
            ("url", self.url.as_deref().map_or(true, |s| s.trim().is_empty())),
            ("username", self.username.is_none()),
            ("password", self.password.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();
        if !missing.is_empty() {
            return Err(TenantError::InvalidCredentials(format!(
                "missing required fields: {}",
                missing.join(", ")
            )));
        }

        let (Some(id), Some(url), Some(username), Some(password)) =
            (self.tenant_id, self.url, self.username, self.password)
        else {
            return Err(TenantError::InvalidCredentials("incomplete tenant definition".into()));
        };
        let id = validate_tenant_id(id.trim())?;
        Ok(TenantDefinition {
            id,
            credentials: ConnectionCredentials::new(url.trim(), username, password),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(id: Option<&str>, url: Option<&str>, user: Option<&str>, pass: Option<&str>) -> TenantSpec {
        TenantSpec {
            tenant_id: id.map(String::from),
            url: url.map(String::from),
            username: user.map(String::from),
            password: pass.map(String::from),
        }
    }

    #[test]
    fn complete_spec_validates() {
        let def = spec(Some(" acme "), Some("postgres://db/acme"), Some("acme"), Some(""))
            .validate()
            .unwrap();
        assert_eq!(def.id, TenantId::from("acme"));
        assert_eq!(def.credentials.url, "postgres://db/acme");
        assert_eq!(def.credentials.password, "");
    }

    #[test]
    fn missing_fields_are_listed() {
        let err = spec(Some("acme"), None, Some("u"), None).validate().unwrap_err();
        match err {
            TenantError::InvalidCredentials(msg) => {
                assert!(msg.contains("url"));
                assert!(msg.contains("password"));
                assert!(!msg.contains("username"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn empty_id_is_missing() {
        let err = spec(Some("  "), Some("db://x"), Some("u"), Some("p")).validate().unwrap_err();
        assert!(matches!(err, TenantError::InvalidCredentials(msg) if msg.contains("tenantId")));
    }

    #[test]
    fn tenant_id_charset() {
        assert!(validate_tenant_id("acme-01.eu_west").is_ok());
        assert!(validate_tenant_id("../etc").is_err());
        assert!(validate_tenant_id("a b").is_err());
        assert!(validate_tenant_id(&"x".repeat(64)).is_err());
    }

    #[test]
    fn spec_accepts_id_alias() {
        let spec: TenantSpec =
            serde_json::from_str(r#"{"id":"acme","url":"db://acme","username":"u","password":"p"}"#).unwrap();
        assert_eq!(spec.tenant_id.as_deref(), Some("acme"));
    }
}

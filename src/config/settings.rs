//! Service settings from environment variables.

use crate::error::ConfigError;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Which credential source backs lazy tenant resolution. Fixed for the life of the process.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolverKind {
    /// Credential files scanned once at startup.
    Static,
    /// Rows of the durable `_sys_tenants` table.
    Registry,
}

impl FromStr for ResolverKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "static" => Ok(ResolverKind::Static),
            "registry" => Ok(ResolverKind::Registry),
            _ => Err(ConfigError::Invalid {
                key: "TENANT_RESOLVER",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Settings {
    /// Base database: default connection and home of the tenant registry.
    pub database_url: String,
    pub bind_addr: String,
    /// Schema holding `_sys_tenants`. Must be a valid PostgreSQL identifier.
    pub admin_schema: String,
    pub resolver: ResolverKind,
    pub startup_dir: PathBuf,
    pub runtime_dir: PathBuf,
    pub max_connections: u32,
    pub probe_timeout: Duration,
    pub resolve_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            database_url: "postgres://localhost/tenants".into(),
            bind_addr: "0.0.0.0:3000".into(),
            admin_schema: "admin".into(),
            resolver: ResolverKind::Static,
            startup_dir: PathBuf::from("tenants/on_startup"),
            runtime_dir: PathBuf::from("tenants/at_runtime"),
            max_connections: 5,
            probe_timeout: Duration::from_millis(5000),
            resolve_timeout: Duration::from_millis(5000),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut s = Settings::default();
        if let Some(v) = lookup("DATABASE_URL") {
            s.database_url = v;
        }
        if let Some(v) = lookup("BIND_ADDR") {
            s.bind_addr = v;
        }
        if let Some(v) = lookup("ADMIN_SCHEMA") {
            if !is_identifier(&v) {
                return Err(ConfigError::Invalid {
                    key: "ADMIN_SCHEMA",
                    value: v,
                });
            }
            s.admin_schema = v;
        }
        if let Some(v) = lookup("TENANT_RESOLVER") {
            s.resolver = v.parse()?;
        }
        if let Some(v) = lookup("TENANTS_STARTUP_DIR") {
            s.startup_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("TENANTS_RUNTIME_DIR") {
            s.runtime_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("TENANT_MAX_CONNECTIONS") {
            s.max_connections = parse_positive("TENANT_MAX_CONNECTIONS", &v)? as u32;
        }
        if let Some(v) = lookup("TENANT_PROBE_TIMEOUT_MS") {
            s.probe_timeout = Duration::from_millis(parse_positive("TENANT_PROBE_TIMEOUT_MS", &v)?);
        }
        if let Some(v) = lookup("TENANT_RESOLVE_TIMEOUT_MS") {
            s.resolve_timeout = Duration::from_millis(parse_positive("TENANT_RESOLVE_TIMEOUT_MS", &v)?);
        }
        if s.database_url.is_empty() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }
        Ok(s)
    }
}

fn parse_positive(key: &'static str, value: &str) -> Result<u64, ConfigError> {
    match value.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n as u64),
        _ => Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
        }),
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

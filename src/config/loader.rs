//! Load tenant definitions from directories of JSON credential files.
//!
//! Each `*.json` file holds one tuple: `{"id": "...", "url": "...", "username": "...", "password": "..."}`.

use crate::config::{TenantDefinition, TenantSpec};
use crate::error::{ResolveError, TenantError};
use crate::tenant::{Connector, TenantRouter};
use std::path::{Path, PathBuf};

/// Sorted `*.json` files in `dir`. A missing directory yields no files.
pub async fn definition_files(dir: &Path) -> Result<Vec<PathBuf>, ResolveError> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!("tenant credential directory {} not found", dir.display());
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some("json") && entry.file_type().await?.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Read one credential file without validating it.
pub async fn read_spec(path: &Path) -> Result<TenantSpec, ResolveError> {
    let raw = tokio::fs::read_to_string(path).await?;
    serde_json::from_str(&raw).map_err(|source| ResolveError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Why one credential file did not produce a tenant definition.
#[derive(Debug, thiserror::Error)]
pub enum LoadFailure {
    #[error(transparent)]
    Read(#[from] ResolveError),
    #[error(transparent)]
    Invalid(#[from] TenantError),
}

/// Read and validate every credential file in `dir`, one result per file.
pub async fn load_definitions(dir: &Path) -> Result<Vec<(PathBuf, Result<TenantDefinition, LoadFailure>)>, ResolveError> {
    let mut out = Vec::new();
    for path in definition_files(dir).await? {
        let result = match read_spec(&path).await {
            Ok(spec) => spec.validate().map_err(LoadFailure::Invalid),
            Err(e) => Err(LoadFailure::Read(e)),
        };
        out.push((path, result));
    }
    Ok(out)
}

/// Add every tenant found in `dir` before traffic starts. Files that cannot be read or
/// validated, and tenants whose database cannot be reached, are logged and skipped.
/// Returns the number of tenants added.
pub async fn load_startup_tenants<C: Connector>(router: &TenantRouter<C>, dir: &Path) -> usize {
    let definitions = match load_definitions(dir).await {
        Ok(d) => d,
        Err(e) => {
            tracing::error!("could not scan tenant directory {}: {}", dir.display(), e);
            return 0;
        }
    };
    let mut added = 0;
    for (path, result) in definitions {
        let def = match result {
            Ok(def) => def,
            Err(e) => {
                tracing::error!("skipping tenant file {}: {}", path.display(), e);
                continue;
            }
        };
        match router.add_tenant(def.id.clone(), &def.credentials).await {
            Ok(()) => {
                tracing::info!("loaded pool for tenant '{}'", def.id);
                added += 1;
            }
            Err(e) => tracing::error!("could not load pool for tenant '{}': {}", def.id, e),
        }
    }
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tenant::connector::mock::MockConnector;
    use crate::tenant::{PoolCache, StaticResolver, TenantId};
    use std::sync::Arc;
    use std::time::Duration;

    fn write(dir: &Path, name: &str, body: &str) {
        std::fs::write(dir.join(name), body).unwrap();
    }

    #[tokio::test]
    async fn missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let files = definition_files(&dir.path().join("absent")).await.unwrap();
        assert!(files.is_empty());
    }

    #[tokio::test]
    async fn only_json_files_are_read_in_order() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.json", r#"{"id":"b","url":"db://b","username":"u","password":"p"}"#);
        write(dir.path(), "a.json", r#"{"id":"a","url":"db://a","username":"u","password":"p"}"#);
        write(dir.path(), "notes.txt", "ignored");
        let defs = load_definitions(dir.path()).await.unwrap();
        let ids: Vec<String> = defs
            .into_iter()
            .map(|(_, r)| r.unwrap().id.to_string())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn startup_load_skips_bad_entries() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "acme.json", r#"{"id":"acme","url":"db://acme","username":"u","password":"p"}"#);
        write(dir.path(), "broken.json", "{ not json");
        write(dir.path(), "partial.json", r#"{"id":"partial","url":"db://partial"}"#);
        write(dir.path(), "down.json", r#"{"id":"down","url":"db://unreachable","username":"u","password":"p"}"#);

        let connector = MockConnector::default();
        let default = connector.handle("db://base");
        let cache = Arc::new(PoolCache::new(connector, default, Duration::from_secs(1)));
        let router = TenantRouter::new(cache, Arc::new(StaticResolver::default()), Duration::from_secs(1));

        let added = load_startup_tenants(&router, dir.path()).await;
        assert_eq!(added, 1);
        assert_eq!(router.list_tenants(), vec![TenantId::from("acme")]);
    }
}

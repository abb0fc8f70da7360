//! Tenant routing through the public API: startup loading, lazy resolution, rotation, isolation.

mod support;

use std::sync::Arc;
use support::{definition, router_with, static_router};
use tenant_router::{context, load_startup_tenants, ConnectionCredentials, StaticResolver, TenantError, TenantId};

fn write_tenant(dir: &std::path::Path, id: &str, url: &str) {
    let body = serde_json::json!({ "id": id, "url": url, "username": "user", "password": "secret" });
    std::fs::write(dir.join(format!("{}.json", id)), body.to_string()).unwrap();
}

#[tokio::test]
async fn startup_tenants_are_listed_and_routed() {
    let startup = tempfile::tempdir().unwrap();
    write_tenant(startup.path(), "acme", "db://acme");
    write_tenant(startup.path(), "globex", "db://globex");

    let (router, _) = router_with(Arc::new(StaticResolver::default()));
    assert_eq!(load_startup_tenants(&router, startup.path()).await, 2);
    assert_eq!(router.list_tenants(), vec![TenantId::from("acme"), TenantId::from("globex")]);

    let pool = router
        .with_tenant("acme".into(), router.resolve_connection())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(pool.url, "db://acme");

    let err = router.with_tenant("nope".into(), async {}).await.unwrap_err();
    assert!(matches!(err, TenantError::NotFound(_)));
}

#[tokio::test]
async fn runtime_directory_feeds_lazy_resolution() {
    let runtime = tempfile::tempdir().unwrap();
    write_tenant(runtime.path(), "initech", "db://initech");
    let resolver = StaticResolver::from_dir(runtime.path()).await.unwrap();
    let (router, _) = router_with(Arc::new(resolver));

    assert!(router.list_tenants().is_empty());
    let pool = router
        .with_tenant("initech".into(), router.resolve_connection())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(pool.url, "db://initech");
    assert_eq!(router.list_tenants(), vec![TenantId::from("initech")]);
}

#[tokio::test]
async fn unset_context_uses_default_pool() {
    let (router, _) = static_router(vec![definition("acme", "db://acme")]);
    let pool = context::scope(router.resolve_connection()).await.unwrap();
    assert_eq!(pool, router.default_handle());
}

#[tokio::test]
async fn credential_rotation_replaces_and_releases() {
    let (router, connector) = static_router(vec![]);
    router
        .add_tenant("acme".into(), &ConnectionCredentials::new("db://acme-a", "u", "p"))
        .await
        .unwrap();
    let first = router.cache().get("acme").unwrap();
    router
        .add_tenant("acme".into(), &ConnectionCredentials::new("db://acme-b", "u", "p"))
        .await
        .unwrap();

    assert_eq!(router.list_tenants().len(), 1);
    assert_eq!(router.cache().get("acme").unwrap().url, "db://acme-b");
    assert_eq!(connector.released(), vec![first.id]);
}

#[tokio::test]
async fn failed_add_keeps_previous_entry() {
    let (router, _) = static_router(vec![]);
    router
        .add_tenant("acme".into(), &ConnectionCredentials::new("db://acme", "u", "p"))
        .await
        .unwrap();
    let err = router
        .add_tenant("acme".into(), &ConnectionCredentials::new("db://unreachable", "u", "p"))
        .await
        .unwrap_err();
    assert!(matches!(err, TenantError::ConnectFailed { .. }));
    assert_eq!(router.cache().get("acme").unwrap().url, "db://acme");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_see_only_their_own_tenant() {
    let (router, _) = static_router(vec![definition("t1", "db://t1"), definition("t2", "db://t2")]);
    let mut tasks = Vec::new();
    for i in 0..16 {
        let router = router.clone();
        let id = if i % 2 == 0 { "t1" } else { "t2" };
        tasks.push(tokio::spawn(async move {
            router
                .with_tenant(id.into(), async {
                    for _ in 0..20 {
                        tokio::task::yield_now().await;
                        assert_eq!(router.current_tenant(), Some(TenantId::from(id)));
                        let pool = router.resolve_connection().await.unwrap();
                        assert_eq!(pool.url, format!("db://{}", id));
                    }
                })
                .await
                .unwrap();
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }
    assert_eq!(router.list_tenants(), vec![TenantId::from("t1"), TenantId::from("t2")]);
}

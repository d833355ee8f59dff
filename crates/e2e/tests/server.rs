use std::sync::Arc;

use sharespace_e2e::client::TestContext;
use sharespace_e2e::runner;

/// Run against `BASE_URL` when set (the server there must trust `JWT_SECRET`),
/// otherwise against a server spawned in-process on an ephemeral port.
async fn get_ctx() -> TestContext {
    match std::env::var("BASE_URL").or_else(|_| std::env::var("SHARESPACE_BASE_URL")) {
        Ok(base_url) => {
            let secret = std::env::var("JWT_SECRET").expect("JWT_SECRET must be set with BASE_URL");
            TestContext::remote(base_url, secret)
        }
        Err(_) => TestContext::spawn_local()
            .await
            .expect("failed to start in-process server"),
    }
}

macro_rules! e2e_test {
    ($module:ident :: $name:ident) => {
        #[tokio::test]
        async fn $name() {
            let ctx = get_ctx().await;
            sharespace_e2e::specs::$module::$name(&ctx).await.unwrap();
        }
    };
}

sharespace_e2e::for_each_spec!(e2e_test);

/// Many users hitting one server at once must not see each other's data.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_tenants_on_shared_server() {
    let ctx = Arc::new(get_ctx().await);
    let report = runner::run_modules(ctx, &["members", "items", "typed"]).await;
    eprintln!("{}", report.summary());

    let tallies = report.by_module();
    assert_eq!(
        tallies.keys().copied().collect::<Vec<_>>(),
        ["items", "members", "typed"]
    );
    assert!(tallies.values().all(|t| t.passed > 0));
    assert_eq!(report.failures().count(), 0, "{}", report.summary());
}

#[tokio::test]
async fn unknown_route_returns_not_found() {
    let ctx = get_ctx().await;
    for path in ["/api/items", "/workspaces/x/unknown", "/items/x/history"] {
        let resp = ctx.get(path).await.expect("request failed");
        assert_eq!(resp.status().as_u16(), 404, "expected 404 for {path}");
    }
}

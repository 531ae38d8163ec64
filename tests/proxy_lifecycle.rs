//! Proxy lifecycle over real HTTP with a counting fake origin
//!
//! Run with: cargo test --test proxy_lifecycle

use std::sync::Arc;

use tempfile::TempDir;
use tokio::sync::oneshot;

use lasval_proxy::test_utils::FakeOrigin;
use lasval_proxy::{server, CacheStorage, ProxyHost, CACHE_SOURCE_HEADER};

struct RunningProxy {
    base: String,
    stop: Option<oneshot::Sender<()>>,
}

impl Drop for RunningProxy {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }
}

async fn start(host: Arc<ProxyHost<FakeOrigin>>) -> RunningProxy {
    let listener = server::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let (tx, rx) = oneshot::channel::<()>();
    tokio::spawn(server::serve(listener, host, async {
        let _ = rx.await;
    }));
    RunningProxy {
        base,
        stop: Some(tx),
    }
}

fn source(response: &reqwest::Response) -> String {
    response
        .headers()
        .get(CACHE_SOURCE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[tokio::test]
async fn test_manifest_resources_served_from_cache() {
    let origin = Arc::new(FakeOrigin::shell());
    let host = Arc::new(ProxyHost::new(
        Arc::new(CacheStorage::in_memory()),
        origin.clone(),
    ));
    host.deploy("v1").await.unwrap();
    let after_install = origin.calls();
    let proxy = start(host).await;

    for _ in 0..2 {
        let response = reqwest::get(format!("{}/static/css/styles.css", proxy.base))
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(source(&response), "cache");
    }
    assert_eq!(origin.calls(), after_install);
}

#[tokio::test]
async fn test_offline_navigation_gets_cached_root() {
    let origin = Arc::new(FakeOrigin::shell());
    let host = Arc::new(ProxyHost::new(
        Arc::new(CacheStorage::in_memory()),
        origin.clone(),
    ));
    host.deploy("v1").await.unwrap();
    let proxy = start(host).await;
    origin.set_online(false);

    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/history", proxy.base))
        .header("accept", "text/html,application/xhtml+xml")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(source(&response), "fallback");
    assert_eq!(response.text().await.unwrap(), FakeOrigin::ROOT_BODY);

    let asset = client
        .get(format!("{}/static/js/app.js", proxy.base))
        .send()
        .await
        .unwrap();
    assert_eq!(asset.status(), 502);
}

#[tokio::test]
async fn test_upload_is_never_cached() {
    let origin = Arc::new(FakeOrigin::shell());
    let host = Arc::new(ProxyHost::new(
        Arc::new(CacheStorage::in_memory()),
        origin.clone(),
    ));
    host.deploy("v1").await.unwrap();
    let proxy = start(host.clone()).await;

    let client = reqwest::Client::new();
    let calls = origin.calls();
    for _ in 0..2 {
        let response = client
            .post(format!("{}/validate", proxy.base))
            .body("~V\n")
            .send()
            .await
            .unwrap();
        assert_eq!(source(&response), "passthrough");
    }

    assert_eq!(origin.calls(), calls + 2);
    assert_eq!(host.storage().entry_count("las-validator-v1").await, 4);
}

#[tokio::test]
async fn test_version_bump_survives_restart() {
    let cache_dir = TempDir::new().unwrap();
    let origin = Arc::new(FakeOrigin::shell());

    {
        let storage = Arc::new(CacheStorage::open_dir(cache_dir.path()).await.unwrap());
        let host = ProxyHost::new(storage, origin.clone());
        host.deploy("v1").await.unwrap();
        host.deploy("v2").await.unwrap();
    }

    let storage = Arc::new(CacheStorage::open_dir(cache_dir.path()).await.unwrap());
    assert_eq!(storage.keys().await, vec!["las-validator-v2".to_string()]);
    assert!(storage.match_in("las-validator-v1", "/").await.is_none());
    assert_eq!(
        storage.match_in("las-validator-v2", "/").await.unwrap().body,
        FakeOrigin::ROOT_BODY
    );
}

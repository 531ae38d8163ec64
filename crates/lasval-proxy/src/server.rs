//! HTTP front of the proxy
//!
//! Every request, whatever its path, is handed to the [`ProxyHost`]. The
//! `x-lasval-cache` response header tells where the response came from.

use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Request, State};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tokio::net::TcpListener;

use lasval_core::prelude::*;

use crate::host::ProxyHost;
use crate::request::ProxyRequest;
use crate::upstream::Upstream;

/// Header naming the [`ResponseSource`](crate::worker::ResponseSource)
pub const CACHE_SOURCE_HEADER: &str = "x-lasval-cache";

/// Largest request body forwarded upstream; LAS uploads are capped well below
pub const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

pub fn router<U>(host: Arc<ProxyHost<U>>) -> Router
where
    U: Upstream + Send + Sync + 'static,
{
    Router::new()
        .fallback(proxy_handler::<U>)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(host)
}

async fn proxy_handler<U>(State(host): State<Arc<ProxyHost<U>>>, request: Request) -> Response
where
    U: Upstream + Send + Sync + 'static,
{
    let (parts, body) = request.into_parts();
    let body = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(body) => body,
        Err(e) => {
            warn!("Rejected request body for {}: {}", parts.uri, e);
            return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response();
        }
    };

    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());

    let request = ProxyRequest {
        method: parts.method,
        path_and_query,
        headers: parts.headers,
        body,
    };
    let method = request.method.clone();
    let target = request.path_and_query.clone();

    match host.handle(request).await {
        Ok(intercepted) => {
            debug!("{} {} -> {} ({})", method, target, intercepted.response.status, intercepted.source);
            let mut response = intercepted.response.into_response();
            response.headers_mut().insert(
                CACHE_SOURCE_HEADER,
                HeaderValue::from_static(intercepted.source.as_str()),
            );
            response
        }
        Err(e) => {
            warn!("{} {} failed: {}", method, target, e);
            (StatusCode::BAD_GATEWAY, "Upstream unavailable").into_response()
        }
    }
}

pub async fn bind(addr: &str) -> Result<TcpListener> {
    let socket: SocketAddr = addr.parse().map_err(|e| Error::ProxyBind {
        addr: addr.to_string(),
        reason: format!("{}", e),
    })?;
    TcpListener::bind(socket).await.map_err(|e| Error::ProxyBind {
        addr: addr.to_string(),
        reason: e.to_string(),
    })
}

/// Serve until `shutdown` resolves
pub async fn serve<U, F>(listener: TcpListener, host: Arc<ProxyHost<U>>, shutdown: F) -> Result<()>
where
    U: Upstream + Send + Sync + 'static,
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!("Proxy listening on http://{}", addr);
    }
    axum::serve(listener, router(host))
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("Proxy stopped");
    Ok(())
}

/// `<cache dir>/las-validator/shell-cache`, when the platform has one
pub fn default_cache_dir() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("las-validator").join("shell-cache"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::CacheStorage;
    use crate::test_utils::FakeOrigin;

    async fn start(host: Arc<ProxyHost<FakeOrigin>>) -> (String, tokio::sync::oneshot::Sender<()>) {
        let listener = bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(serve(listener, host, async {
            let _ = rx.await;
        }));
        (format!("http://{}", addr), tx)
    }

    #[tokio::test]
    async fn test_serves_cached_shell_with_source_header() {
        let origin = Arc::new(FakeOrigin::shell());
        let host = Arc::new(ProxyHost::new(Arc::new(CacheStorage::in_memory()), origin.clone()));
        host.deploy("v1").await.unwrap();
        let (base, stop) = start(host).await;

        let response = reqwest::get(format!("{}/", base)).await.unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(
            response.headers().get(CACHE_SOURCE_HEADER).unwrap(),
            "cache"
        );
        assert_eq!(response.text().await.unwrap(), FakeOrigin::ROOT_BODY);

        let _ = stop.send(());
    }

    #[tokio::test]
    async fn test_unreachable_origin_is_bad_gateway() {
        let origin = Arc::new(FakeOrigin::shell());
        let host = Arc::new(ProxyHost::new(Arc::new(CacheStorage::in_memory()), origin.clone()));
        origin.set_online(false);
        let (base, stop) = start(host).await;

        let response = reqwest::get(format!("{}/static/js/app.js", base)).await.unwrap();
        assert_eq!(response.status(), 502);

        let _ = stop.send(());
    }

    #[tokio::test]
    async fn test_bind_rejects_bad_address() {
        let err = bind("not-an-address").await.unwrap_err();
        assert!(matches!(err, Error::ProxyBind { .. }));
    }
}

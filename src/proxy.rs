//! `lasval proxy` - serve the web shell through the versioned cache

use std::sync::Arc;

use lasval_app::config::ProxySettings;
use lasval_core::prelude::*;
use lasval_proxy::server;
use lasval_proxy::{default_cache_dir, CacheStorage, HttpUpstream, ProxyHost};

/// Open the store, deploy the configured version and serve until Ctrl+C.
///
/// A failed deploy is not fatal; requests then pass straight through to the
/// upstream.
pub async fn run_proxy(settings: &ProxySettings) -> Result<()> {
    info!("═══════════════════════════════════════════════════════");
    info!("LAS validator proxy starting");
    info!("Upstream: {}", settings.upstream);
    info!("Shell version: {}", settings.version);
    info!("═══════════════════════════════════════════════════════");

    let storage = match settings.cache_dir.clone().or_else(default_cache_dir) {
        Some(dir) => CacheStorage::open_dir(dir).await?,
        None => {
            warn!("No cache directory available, caching in memory only");
            CacheStorage::in_memory()
        }
    };
    let upstream = HttpUpstream::new(&settings.upstream)?;
    let host = Arc::new(ProxyHost::new(Arc::new(storage), Arc::new(upstream)));

    let listener = server::bind(&settings.listen).await?;

    if let Err(e) = host.deploy(&settings.version).await {
        warn!(
            "Shell version {} not installed, passing requests through: {}",
            settings.version, e
        );
    }

    server::serve(listener, host, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    })
    .await
}

//! Owner of the controlling worker
//!
//! Deploying a version installs and activates a fresh worker next to the
//! current one. The old worker is superseded only once both succeeded, so a
//! failed deploy leaves the previous version serving.

use std::sync::Arc;

use tokio::sync::RwLock;

use lasval_core::prelude::*;

use crate::manifest::CacheVersion;
use crate::request::ProxyRequest;
use crate::store::CacheStorage;
use crate::upstream::Upstream;
use crate::worker::{Intercepted, ProxyWorker, ResponseSource};

pub struct ProxyHost<U> {
    storage: Arc<CacheStorage>,
    upstream: Arc<U>,
    controller: RwLock<Option<Arc<ProxyWorker<U>>>>,
}

impl<U> ProxyHost<U>
where
    U: Upstream + Sync,
{
    pub fn new(storage: Arc<CacheStorage>, upstream: Arc<U>) -> Self {
        Self {
            storage,
            upstream,
            controller: RwLock::new(None),
        }
    }

    /// Install, activate and take control with `version`
    pub async fn deploy(&self, version: &str) -> Result<Arc<ProxyWorker<U>>> {
        let worker = Arc::new(ProxyWorker::new(
            CacheVersion::for_version(version),
            self.storage.clone(),
            self.upstream.clone(),
        ));

        if let Err(e) = worker.install().await {
            error!("Install of {} failed: {}", worker.version(), e);
            return Err(e);
        }

        // Held across activation so requests never see a gap in control
        let mut controller = self.controller.write().await;
        if let Err(e) = worker.activate().await {
            error!("Activation of {} failed: {}", worker.version(), e);
            return Err(e);
        }
        if let Some(previous) = controller.replace(worker.clone()) {
            previous.supersede();
        }

        info!("{} now controls all clients", worker.version());
        Ok(worker)
    }

    pub async fn controller(&self) -> Option<Arc<ProxyWorker<U>>> {
        self.controller.read().await.clone()
    }

    /// Route a request through the controlling worker, or straight to the
    /// network when there is none
    pub async fn handle(&self, request: ProxyRequest) -> Result<Intercepted> {
        let controller = self.controller().await;
        match controller {
            Some(worker) => worker.intercept(request).await,
            None => {
                let response = self.upstream.fetch(&request).await?;
                Ok(Intercepted {
                    response,
                    source: ResponseSource::Passthrough,
                })
            }
        }
    }

    pub fn storage(&self) -> &Arc<CacheStorage> {
        &self.storage
    }
}

//! One versioned proxy worker and its install → activate → intercept lifecycle

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use futures_util::future::try_join_all;

use lasval_core::prelude::*;

use crate::manifest::{CacheVersion, PRECACHE_MANIFEST, ROOT_DOCUMENT};
use crate::request::{ProxyRequest, ProxyResponse};
use crate::store::CacheStorage;
use crate::upstream::Upstream;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerState {
    Installing,
    Active(CacheVersion),
    /// Replaced by a newer worker; only passes requests through
    Superseded,
}

/// Where an intercepted response came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    Cache,
    Network,
    /// Cached root document served for an offline navigation
    Fallback,
    /// Not handled by the cache at all
    Passthrough,
}

impl ResponseSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseSource::Cache => "cache",
            ResponseSource::Network => "network",
            ResponseSource::Fallback => "fallback",
            ResponseSource::Passthrough => "passthrough",
        }
    }
}

impl fmt::Display for ResponseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Intercepted {
    pub response: ProxyResponse,
    pub source: ResponseSource,
}

pub struct ProxyWorker<U> {
    version: CacheVersion,
    storage: Arc<CacheStorage>,
    upstream: Arc<U>,
    state: RwLock<WorkerState>,
    /// Set once install succeeded; activation does not wait for older workers
    skip_waiting: AtomicBool,
}

impl<U> ProxyWorker<U>
where
    U: Upstream + Sync,
{
    pub fn new(version: CacheVersion, storage: Arc<CacheStorage>, upstream: Arc<U>) -> Self {
        Self {
            version,
            storage,
            upstream,
            state: RwLock::new(WorkerState::Installing),
            skip_waiting: AtomicBool::new(false),
        }
    }

    pub fn version(&self) -> &CacheVersion {
        &self.version
    }

    pub fn state(&self) -> WorkerState {
        self.state
            .read()
            .map(|s| s.clone())
            .unwrap_or_else(|e| e.into_inner().clone())
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state(), WorkerState::Active(_))
    }

    pub fn is_ready(&self) -> bool {
        self.skip_waiting.load(Ordering::Acquire)
    }

    /// Fetch every manifest resource and store it in this worker's cache.
    ///
    /// All-or-nothing: the cache is only written once every resource came
    /// back with status 200.
    pub async fn install(&self) -> Result<()> {
        let cache = self.version.name();
        info!("Installing {}", cache);

        let upstream = &self.upstream;
        let fetches = PRECACHE_MANIFEST.into_iter().map(|path| async move {
            let response = upstream.fetch(&ProxyRequest::get(path)).await?;
            if !response.is_cacheable() {
                return Err(Error::proxy_install(format!(
                    "{} returned status {}",
                    path, response.status
                )));
            }
            Ok((path, response))
        });

        let responses = try_join_all(fetches).await.map_err(|e| match e {
            Error::ProxyInstall { .. } => e,
            other => Error::proxy_install(other.to_string()),
        })?;

        self.storage.open(cache).await?;
        for (path, response) in responses {
            self.storage.put(cache, path, response).await?;
        }

        self.skip_waiting.store(true, Ordering::Release);
        info!("Installed {} ({} resources)", cache, PRECACHE_MANIFEST.len());
        Ok(())
    }

    /// Delete every other cache generation and start serving from ours
    pub async fn activate(&self) -> Result<()> {
        if !self.is_ready() {
            return Err(Error::proxy_install(format!(
                "{} activated before a successful install",
                self.version
            )));
        }

        for name in self.storage.keys().await {
            if !self.version.matches(&name) {
                self.storage.delete(&name).await?;
            }
        }

        self.set_state(WorkerState::Active(self.version.clone()));
        info!("Activated {}", self.version);
        Ok(())
    }

    pub fn supersede(&self) {
        debug!("{} superseded", self.version);
        self.set_state(WorkerState::Superseded);
    }

    /// Cache-first handling of one request
    pub async fn intercept(&self, request: ProxyRequest) -> Result<Intercepted> {
        if !self.is_active() || !request.is_cacheable_method() {
            let response = self.upstream.fetch(&request).await?;
            return Ok(Intercepted {
                response,
                source: ResponseSource::Passthrough,
            });
        }

        let cache = self.version.name();
        let key = request.cache_key();

        if let Some(response) = self.storage.match_in(cache, key).await {
            trace!("Cache hit {}", key);
            return Ok(Intercepted {
                response,
                source: ResponseSource::Cache,
            });
        }

        match self.upstream.fetch(&request).await {
            Ok(response) => {
                if response.is_cacheable() {
                    if let Err(e) = self.storage.put(cache, key, response.clone()).await {
                        warn!("Failed to cache {}: {}", key, e);
                    }
                }
                Ok(Intercepted {
                    response,
                    source: ResponseSource::Network,
                })
            }
            Err(e) if request.is_navigation() => {
                match self.storage.match_in(cache, ROOT_DOCUMENT).await {
                    Some(response) => {
                        info!("Offline navigation to {}, serving cached shell", key);
                        Ok(Intercepted {
                            response,
                            source: ResponseSource::Fallback,
                        })
                    }
                    None => Err(e),
                }
            }
            Err(e) => Err(e),
        }
    }

    fn set_state(&self, next: WorkerState) {
        match self.state.write() {
            Ok(mut state) => *state = next,
            Err(e) => *e.into_inner() = next,
        }
    }
}

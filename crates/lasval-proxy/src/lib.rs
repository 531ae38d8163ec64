//! lasval-proxy - Versioned caching proxy for the validator's web shell
//!
//! A [`ProxyWorker`] pre-caches the shell manifest into a cache generation
//! named after its version, takes over on activation (purging every other
//! generation) and then answers GET requests cache-first. Offline page
//! navigations fall back to the cached root document.
//!
//! [`ProxyHost`] owns the controlling worker and [`server`] puts it behind an
//! axum listener.

pub mod host;
pub mod manifest;
pub mod request;
pub mod server;
pub mod store;
pub mod upstream;
pub mod worker;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_utils;

pub use host::ProxyHost;
pub use manifest::{CacheVersion, CACHE_NAME_PREFIX, PRECACHE_MANIFEST, ROOT_DOCUMENT};
pub use request::{ProxyRequest, ProxyResponse, ResponseKind};
pub use server::{default_cache_dir, router, serve, CACHE_SOURCE_HEADER};
pub use store::CacheStorage;
pub use upstream::{HttpUpstream, LocalUpstream, Upstream};
pub use worker::{Intercepted, ProxyWorker, ResponseSource, WorkerState};

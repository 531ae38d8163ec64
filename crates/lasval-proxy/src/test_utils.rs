//! Test utilities for the proxy
//!
//! `FakeOrigin` serves the application shell from memory, counts fetches
//! and can be switched offline.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use bytes::Bytes;

use lasval_core::prelude::*;

use crate::manifest::PRECACHE_MANIFEST;
use crate::request::{ProxyRequest, ProxyResponse};
use crate::upstream::Upstream;

pub struct FakeOrigin {
    routes: HashMap<String, ProxyResponse>,
    calls: AtomicUsize,
    online: AtomicBool,
}

impl FakeOrigin {
    pub const ROOT_BODY: &'static str = "<!doctype html><title>LAS Validator</title>";

    /// Origin serving every manifest resource with status 200
    pub fn shell() -> Self {
        let routes = PRECACHE_MANIFEST
            .into_iter()
            .map(|path| {
                let body = if path == "/" {
                    Self::ROOT_BODY.to_string()
                } else {
                    format!("shell resource {}", path)
                };
                (path.to_string(), ProxyResponse::basic(200, body))
            })
            .collect();

        Self {
            routes,
            calls: AtomicUsize::new(0),
            online: AtomicBool::new(true),
        }
    }

    pub fn with_route(mut self, path: &str, body: &str) -> Self {
        self.routes.insert(
            path.to_string(),
            ProxyResponse::basic(200, Bytes::from(body.to_string())),
        );
        self
    }

    pub fn without_route(mut self, path: &str) -> Self {
        self.routes.remove(path);
        self
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// Requests that reached the origin
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Upstream for FakeOrigin {
    async fn fetch(&self, request: &ProxyRequest) -> Result<ProxyResponse> {
        if !self.online.load(Ordering::SeqCst) {
            return Err(Error::upstream("connection refused"));
        }
        self.calls.fetch_add(1, Ordering::SeqCst);

        Ok(self
            .routes
            .get(&request.path_and_query)
            .cloned()
            .unwrap_or_else(|| ProxyResponse::basic(404, "not found")))
    }
}

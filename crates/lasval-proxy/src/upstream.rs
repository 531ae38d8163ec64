//! The network side of the proxy

use url::Url;

use lasval_core::prelude::*;

use crate::request::{is_hop_by_hop, ProxyRequest, ProxyResponse, ResponseKind};

/// Fetch a request from the origin.
///
/// `Err` means no response was received at all; any HTTP status, including
/// errors, is an `Ok` response.
#[trait_variant::make(Upstream: Send)]
pub trait LocalUpstream {
    async fn fetch(&self, request: &ProxyRequest) -> Result<ProxyResponse>;
}

/// reqwest-backed origin
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    http: reqwest::Client,
    origin: Url,
}

impl HttpUpstream {
    pub fn new(origin: &str) -> Result<Self> {
        let origin = Url::parse(origin)
            .map_err(|e| Error::config(format!("Invalid upstream URL '{}': {}", origin, e)))?;

        // Redirects go back to the browser untouched
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| Error::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { http, origin })
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// Absolute URL on the origin for a request target.
    ///
    /// The target is only ever a path and query; `//host/...` stays a path
    /// on the origin and never switches hosts.
    pub fn target_url(&self, path_and_query: &str) -> Url {
        let (path, query) = match path_and_query.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (path_and_query, None),
        };
        let mut url = self.origin.clone();
        url.set_path(path);
        url.set_query(query);
        url.set_fragment(None);
        url
    }
}

impl Upstream for HttpUpstream {
    async fn fetch(&self, request: &ProxyRequest) -> Result<ProxyResponse> {
        let url = self.target_url(&request.path_and_query);

        let mut builder = self.http.request(request.method.clone(), url.clone());
        for (name, value) in &request.headers {
            if *name == reqwest::header::HOST || is_hop_by_hop(name.as_str()) {
                continue;
            }
            builder = builder.header(name, value);
        }
        if !request.body.is_empty() {
            builder = builder.body(request.body.clone());
        }

        let response = builder.send().await.map_err(|e| {
            debug!("Upstream {} {} failed: {}", request.method, url, e);
            Error::upstream(e.to_string())
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::upstream(format!("reading body of {}: {}", url, e)))?;

        trace!("Upstream {} {} -> {}", request.method, url, status);
        Ok(ProxyResponse {
            status,
            headers,
            body,
            kind: ResponseKind::Basic,
        })
    }
}

//! Requests and responses as seen by the proxy worker

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Headers that describe one hop and are never forwarded or replayed
const HOP_BY_HOP: [&str; 9] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "content-length",
];

pub fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP.iter().any(|h| name.eq_ignore_ascii_case(h))
}

/// An intercepted request
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    pub method: Method,
    /// Path plus query, always starting with `/`
    pub path_and_query: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ProxyRequest {
    /// Bare GET, as issued at install time
    pub fn get(path: &str) -> Self {
        Self {
            method: Method::GET,
            path_and_query: path.to_string(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// A full-page navigation of the browser
    pub fn navigation(path: &str) -> Self {
        let mut request = Self::get(path);
        request
            .headers
            .insert("sec-fetch-mode", HeaderValue::from_static("navigate"));
        request
            .headers
            .insert(header::ACCEPT, HeaderValue::from_static("text/html"));
        request
    }

    /// Only GET goes through the cache
    pub fn is_cacheable_method(&self) -> bool {
        self.method == Method::GET
    }

    /// `Sec-Fetch-Mode: navigate`, or a GET asking for HTML
    pub fn is_navigation(&self) -> bool {
        if self
            .header_value("sec-fetch-mode")
            .eq_ignore_ascii_case("navigate")
        {
            return true;
        }
        self.method == Method::GET && self.header_value(header::ACCEPT.as_str()).contains("text/html")
    }

    fn header_value(&self, name: &str) -> &str {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
    }

    pub fn cache_key(&self) -> &str {
        &self.path_and_query
    }
}

/// Where a response came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    /// Same-origin response with readable status and headers
    Basic,
    /// Response whose status and body cannot be trusted for caching
    Opaque,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
    pub kind: ResponseKind,
}

impl ProxyResponse {
    pub fn basic(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
            kind: ResponseKind::Basic,
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Plain success: status 200 from the proxied origin
    pub fn is_cacheable(&self) -> bool {
        self.status == 200 && self.kind == ResponseKind::Basic
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl IntoResponse for ProxyResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::BAD_GATEWAY);
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = status;

        let headers = response.headers_mut();
        for (name, value) in &self.headers {
            if is_hop_by_hop(name) {
                continue;
            }
            if let (Ok(name), Ok(value)) = (
                header::HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                headers.append(name, value);
            }
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_detection() {
        assert!(ProxyRequest::navigation("/").is_navigation());

        let mut html = ProxyRequest::get("/about");
        html.headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml"),
        );
        assert!(html.is_navigation());

        assert!(!ProxyRequest::get("/static/css/styles.css").is_navigation());

        let mut post = ProxyRequest::get("/validate");
        post.method = Method::POST;
        post.headers
            .insert(header::ACCEPT, HeaderValue::from_static("text/html"));
        assert!(!post.is_navigation());
    }

    #[test]
    fn test_only_get_is_cacheable() {
        assert!(ProxyRequest::get("/").is_cacheable_method());
        let mut head = ProxyRequest::get("/");
        head.method = Method::HEAD;
        assert!(!head.is_cacheable_method());
    }

    #[test]
    fn test_cacheable_response() {
        assert!(ProxyResponse::basic(200, "ok").is_cacheable());
        assert!(!ProxyResponse::basic(404, "missing").is_cacheable());
        assert!(!ProxyResponse::basic(206, "partial").is_cacheable());

        let mut opaque = ProxyResponse::basic(200, "x");
        opaque.kind = ResponseKind::Opaque;
        assert!(!opaque.is_cacheable());
    }

    #[test]
    fn test_into_response_drops_hop_by_hop() {
        let response = ProxyResponse::basic(200, "body")
            .with_header("Content-Type", "text/css")
            .with_header("Transfer-Encoding", "chunked")
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "text/css");
        assert!(response.headers().get("transfer-encoding").is_none());
    }
}

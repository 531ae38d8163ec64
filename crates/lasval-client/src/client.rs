//! reqwest-backed client for the validation service

use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use lasval_core::prelude::*;
use lasval_core::{SelectedFile, ValidationResult};

use crate::service::ValidationService;

/// Shown when a failed response carries no usable `error` field
pub const GENERIC_SERVER_ERROR: &str = "Validation failed on the server";

const VALIDATE_PATH: &str = "validate";
const HEALTH_PATH: &str = "api/health";

/// Outcome of a `GET /api/health` probe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub healthy: bool,
    pub status_code: u16,
    /// Parsed response body, `null` when it was not JSON
    pub details: Value,
}

/// Client for the remote validation service.
///
/// No request timeout is configured; failure detection is left to the
/// transport.
#[derive(Debug, Clone)]
pub struct ValidationClient {
    http: reqwest::Client,
    validate_url: Url,
    health_url: Url,
}

impl ValidationClient {
    /// Create a client for the service rooted at `base_url`
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base = Url::parse(base_url)
            .map_err(|e| Error::config(format!("Invalid server URL '{}': {}", base_url, e)))?;

        // Url::join drops the last path segment unless the base ends with '/'
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let validate_url = base
            .join(VALIDATE_PATH)
            .map_err(|e| Error::config(format!("Invalid validate URL: {}", e)))?;
        let health_url = base
            .join(HEALTH_PATH)
            .map_err(|e| Error::config(format!("Invalid health URL: {}", e)))?;

        let http = reqwest::Client::builder()
            .user_agent(concat!("lasval/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            validate_url,
            health_url,
        })
    }

    pub fn validate_url(&self) -> &Url {
        &self.validate_url
    }

    /// Upload `file` as the multipart field `file` and classify the outcome
    pub async fn submit(&self, file: &SelectedFile) -> Result<ValidationResult> {
        let part = Part::bytes(file.raw_bytes.to_vec()).file_name(file.name.clone());
        let form = Form::new().part("file", part);

        debug!(
            "Submitting {} ({} bytes) to {}",
            file.name, file.size_bytes, self.validate_url
        );

        let response = self
            .http
            .post(self.validate_url.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                warn!("Validation request failed: {}", e);
                Error::transport(e.to_string())
            })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| Error::transport(format!("Failed to read response: {}", e)))?;

        info!("Validation response for {}: HTTP {}", file.name, status);
        classify_response(status, &body)
    }

    /// Probe the service liveness endpoint
    pub async fn health(&self) -> Result<HealthStatus> {
        let response = self
            .http
            .get(self.health_url.clone())
            .send()
            .await
            .map_err(|e| Error::transport(e.to_string()))?;

        let status_code = response.status().as_u16();
        let healthy = response.status().is_success();
        let body = response.text().await.unwrap_or_default();
        let details = serde_json::from_str(&body).unwrap_or(Value::Null);

        Ok(HealthStatus {
            healthy,
            status_code,
            details,
        })
    }
}

impl ValidationService for ValidationClient {
    async fn validate(&self, file: SelectedFile) -> Result<ValidationResult> {
        self.submit(&file).await
    }
}

/// Map an HTTP status and body to a result or a `ServerError`
pub(crate) fn classify_response(status: u16, body: &str) -> Result<ValidationResult> {
    if (200..300).contains(&status) {
        return ValidationResult::from_json(body).map_err(|e| {
            warn!("Unparseable validation response: {}", e);
            Error::server(Some(status), format!("Invalid response from server: {}", e))
        });
    }

    Err(Error::server(Some(status), extract_error_message(body)))
}

/// The `error` string of a failure body, or the generic fallback
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
        .filter(|msg| !msg.trim().is_empty())
        .unwrap_or_else(|| GENERIC_SERVER_ERROR.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Multipart;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::json;

    async fn spawn_server(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn echo_upload(mut multipart: Multipart) -> Json<Value> {
        let mut file_name = String::new();
        let mut size = 0usize;
        while let Some(field) = multipart.next_field().await.unwrap() {
            let field_name = field.name().map(str::to_string);
            if field_name.as_deref() == Some("file") {
                file_name = field.file_name().unwrap_or_default().to_string();
                size = field.bytes().await.unwrap().len();
            }
        }
        Json(json!({
            "valid": true,
            "summary": file_name,
            "statistics": {"file_size_bytes": size}
        }))
    }

    fn sample_file() -> SelectedFile {
        SelectedFile::new("well.las", 0, b"~VERSION INFORMATION\n".to_vec())
    }

    #[test]
    fn test_classify_success() {
        let result = classify_response(200, r#"{"valid": true, "summary": "ok"}"#).unwrap();
        assert!(result.valid);
    }

    #[test]
    fn test_classify_error_field() {
        let err = classify_response(400, r#"{"error": "Only LAS files"}"#).unwrap_err();
        match err {
            Error::ServerError { status, message } => {
                assert_eq!(status, Some(400));
                assert_eq!(message, "Only LAS files");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_classify_fallback_message() {
        let err = classify_response(502, "<html>Bad Gateway</html>").unwrap_err();
        assert_eq!(err.to_string(), GENERIC_SERVER_ERROR);

        let err = classify_response(500, r#"{"error": ""}"#).unwrap_err();
        assert_eq!(err.to_string(), GENERIC_SERVER_ERROR);
    }

    #[test]
    fn test_classify_invalid_success_body() {
        let err = classify_response(200, "not json").unwrap_err();
        assert!(matches!(err, Error::ServerError { .. }));
    }

    #[test]
    fn test_base_url_with_prefix_keeps_path() {
        let client = ValidationClient::new("http://localhost:5000/las").unwrap();
        assert_eq!(client.validate_url().as_str(), "http://localhost:5000/las/validate");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            ValidationClient::new("not a url"),
            Err(Error::Config { .. })
        ));
    }

    #[tokio::test]
    async fn test_submit_sends_multipart_file_field() {
        let base = spawn_server(Router::new().route("/validate", post(echo_upload))).await;
        let client = ValidationClient::new(&base).unwrap();

        let result = client.submit(&sample_file()).await.unwrap();

        assert_eq!(result.summary.as_deref(), Some("well.las"));
        assert_eq!(
            result.statistics.unwrap().file_size_bytes(),
            Some(b"~VERSION INFORMATION\n".len() as u64)
        );
    }

    #[tokio::test]
    async fn test_submit_server_error_uses_error_field() {
        let app = Router::new().route(
            "/validate",
            post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"error": "Файл не загружен"})),
                )
            }),
        );
        let base = spawn_server(app).await;
        let client = ValidationClient::new(&base).unwrap();

        let err = client.validate(sample_file()).await.unwrap_err();

        assert!(matches!(err, Error::ServerError { status: Some(400), .. }));
        assert_eq!(err.to_string(), "Файл не загружен");
    }

    #[tokio::test]
    async fn test_submit_without_server_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = ValidationClient::new(&format!("http://{}", addr)).unwrap();
        let err = client.submit(&sample_file()).await.unwrap_err();

        assert!(matches!(err, Error::TransportError { .. }));
    }

    #[tokio::test]
    async fn test_health_probe() {
        let app = Router::new().route(
            "/api/health",
            get(|| async { Json(json!({"status": "ok"})) }),
        );
        let base = spawn_server(app).await;
        let client = ValidationClient::new(&base).unwrap();

        let health = client.health().await.unwrap();

        assert!(health.healthy);
        assert_eq!(health.status_code, 200);
        assert_eq!(health.details["status"], "ok");
    }
}

//! Headless runner against an in-process validation service
//!
//! Run with: cargo test --test headless_workflow

use std::path::{Path, PathBuf};

use axum::extract::Multipart;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tempfile::TempDir;

use las_validator::{run_with_service, HeadlessEvent, Outcome, ValidateOptions};
use lasval_app::Settings;
use lasval_client::ValidationClient;
use lasval_core::ExportFormat;

// ─────────────────────────────────────────────────────────
// Stub service
// ─────────────────────────────────────────────────────────

/// Answers by file content: `CRASH` → 500, `BAD` → invalid, else valid
async fn validate(mut multipart: Multipart) -> Response {
    let mut content = String::new();
    let mut name = String::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("file") {
            name = field.file_name().unwrap_or_default().to_string();
            content = String::from_utf8_lossy(&field.bytes().await.unwrap()).into_owned();
        }
    }

    if content.contains("CRASH") {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "Parser crashed"})),
        )
            .into_response();
    }
    if content.contains("BAD") {
        return Json(json!({
            "valid": false,
            "errors": ["Missing ~A section", "NULL value not declared"],
            "warnings": ["Unknown mnemonic DEPT2"],
            "statistics": {"curve_count": 3, "file_size_mb": 0.01}
        }))
        .into_response();
    }
    Json(json!({
        "valid": true,
        "summary": format!("{} conforms to LAS 2.0", name),
        "score": 98,
        "info": ["Wrapped: NO"]
    }))
    .into_response()
}

async fn spawn_service() -> String {
    let app = Router::new().route("/validate", post(validate));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

// ─────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────

fn fast_settings(base_url: &str, export_dir: &Path) -> Settings {
    let mut settings = Settings::default();
    settings.server.base_url = base_url.to_string();
    settings.progress.interval_ms = 1;
    settings.progress.settle_ms = 1;
    settings.export.directory = export_dir.to_path_buf();
    settings
}

fn write_las(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, body).unwrap();
    path
}

async fn run(
    base_url: &str,
    dir: &TempDir,
    options: ValidateOptions,
) -> (Outcome, Vec<Value>) {
    let settings = fast_settings(base_url, &dir.path().join("exports"));
    let client = ValidationClient::new(base_url).unwrap();
    let mut events = Vec::new();

    let outcome = run_with_service(settings, client, &options, |event: HeadlessEvent| {
        events.push(serde_json::to_value(&event).unwrap())
    })
    .await
    .unwrap();

    (outcome, events)
}

fn names(events: &[Value]) -> Vec<&str> {
    events.iter().filter_map(|e| e["event"].as_str()).collect()
}

// ─────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_valid_file_runs_full_workflow() {
    let base = spawn_service().await;
    let dir = TempDir::new().unwrap();
    let file = write_las(&dir, "well.las", "~VERSION INFORMATION\n VERS. 2.0\n~A\n1 2 3\n");

    let (outcome, events) = run(
        &base,
        &dir,
        ValidateOptions {
            file,
            ..Default::default()
        },
    )
    .await;

    assert_eq!(outcome, Outcome::Valid);
    assert_eq!(outcome.exit_code(), 0);

    let names = names(&events);
    let selected = names.iter().position(|n| *n == "file_selected").unwrap();
    let preview = names.iter().position(|n| *n == "preview_ready").unwrap();
    let completed = names.iter().position(|n| *n == "validation_completed").unwrap();
    assert!(selected < preview && preview < completed);
    assert!(names.contains(&"progress"));

    let done = &events[completed];
    assert_eq!(done["valid"], true);
    assert_eq!(done["score"], 98);
    assert_eq!(done["summary"], "well.las conforms to LAS 2.0");

    let preview = &events[preview];
    assert_eq!(preview["total_lines"], 4);
    assert_eq!(preview["section_lines"], 2);
}

#[tokio::test]
async fn test_invalid_file_exports_both_formats() {
    let base = spawn_service().await;
    let dir = TempDir::new().unwrap();
    let file = write_las(&dir, "bad.LAS", "~V\nBAD\n");
    let html = dir.path().join("report").join("results.html");

    let (outcome, events) = run(
        &base,
        &dir,
        ValidateOptions {
            file,
            exports: vec![ExportFormat::Json, ExportFormat::Text],
            html: Some(html.clone()),
        },
    )
    .await;

    assert_eq!(outcome, Outcome::Invalid);
    assert_eq!(outcome.exit_code(), 2);

    let completed = events
        .iter()
        .find(|e| e["event"] == "validation_completed")
        .unwrap();
    assert_eq!(completed["errors"], 2);
    assert_eq!(completed["warnings"], 1);

    let saved: Vec<PathBuf> = events
        .iter()
        .filter(|e| e["event"] == "export_saved")
        .map(|e| PathBuf::from(e["path"].as_str().unwrap()))
        .collect();
    assert_eq!(saved.len(), 2);

    let json_path = saved
        .iter()
        .find(|p| p.extension().is_some_and(|e| e == "json"))
        .unwrap();
    let exported: Value = serde_json::from_str(&std::fs::read_to_string(json_path).unwrap()).unwrap();
    assert_eq!(exported["valid"], false);
    assert_eq!(exported["errors"][0], "Missing ~A section");

    let text_path = saved
        .iter()
        .find(|p| p.extension().is_some_and(|e| e == "txt"))
        .unwrap();
    let text = std::fs::read_to_string(text_path).unwrap();
    assert!(text.contains("bad.LAS"));
    assert!(text.contains("INVALID"));
    assert!(text.contains("  1. Missing ~A section"));

    let page = std::fs::read_to_string(&html).unwrap();
    assert!(page.contains("error-item"));
    assert!(page.contains("warning-item"));
}

#[tokio::test]
async fn test_server_error_fails_the_run() {
    let base = spawn_service().await;
    let dir = TempDir::new().unwrap();
    let file = write_las(&dir, "crash.las", "~V\nCRASH\n");

    let (outcome, events) = run(
        &base,
        &dir,
        ValidateOptions {
            file,
            ..Default::default()
        },
    )
    .await;

    assert_eq!(outcome, Outcome::Failed);
    let failed = events
        .iter()
        .find(|e| e["event"] == "validation_failed")
        .unwrap();
    assert_eq!(failed["kind"], "server");
    assert_eq!(failed["message"], "Parser crashed");
    assert!(!names(&events).contains(&"validation_completed"));
}

#[tokio::test]
async fn test_unreachable_service_is_a_transport_failure() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let dir = TempDir::new().unwrap();
    let file = write_las(&dir, "well.las", "~V\n");

    let (outcome, events) = run(
        &base,
        &dir,
        ValidateOptions {
            file,
            ..Default::default()
        },
    )
    .await;

    assert_eq!(outcome, Outcome::Failed);
    let failed = events
        .iter()
        .find(|e| e["event"] == "validation_failed")
        .unwrap();
    assert_eq!(failed["kind"], "transport");
    assert!(failed["message"]
        .as_str()
        .unwrap()
        .starts_with("Network error:"));
}

#[tokio::test]
async fn test_wrong_extension_is_rejected_without_request() {
    // Nothing listens here; a request would turn into a transport failure
    let base = "http://127.0.0.1:9";
    let dir = TempDir::new().unwrap();
    let file = write_las(&dir, "notes.txt", "~V\n");

    let (outcome, events) = run(
        base,
        &dir,
        ValidateOptions {
            file,
            ..Default::default()
        },
    )
    .await;

    assert_eq!(outcome, Outcome::Failed);
    let names = names(&events);
    assert!(names.contains(&"file_rejected"));
    assert!(!names.contains(&"file_selected"));
    assert!(!names.contains(&"validation_failed"));

    let rejected = events
        .iter()
        .find(|e| e["event"] == "file_rejected")
        .unwrap();
    assert_eq!(rejected["reason"], "Please select a LAS file");
}

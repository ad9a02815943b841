use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use qrspool::api::{display_router, printer_router, ApiState};
use qrspool::config::SpoolConfig;
use qrspool::encode::QrPngEncoder;
use qrspool::spool::PrintSpooler;

fn test_state(dir: &std::path::Path) -> ApiState {
    let encoder = Arc::new(QrPngEncoder {
        module_size: 2,
        border: 1,
        ..Default::default()
    });
    let spooler = PrintSpooler::open(&SpoolConfig::new(dir), encoder).unwrap();
    ApiState {
        spooler: Arc::new(spooler),
    }
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body.to_vec())
}

async fn post_print(app: &Router, body: Body, content_type: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/print")
                .header("content-type", content_type)
                .body(body)
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let dir = tempfile::tempdir().unwrap();
    let app = printer_router(test_state(dir.path()));

    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["service"], "qrspool");
}

#[tokio::test]
async fn print_accepts_json_content() {
    let dir = tempfile::tempdir().unwrap();
    let app = printer_router(test_state(dir.path()));

    let (status, json) = post_print(
        &app,
        Body::from(r#"{"content": "Hello"}"#),
        "application/json",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["file_number"], 1);
    assert_eq!(json["filename"], "1.png");
    assert_eq!(json["content_filename"], "1.txt");
}

#[tokio::test]
async fn print_accepts_raw_text() {
    let dir = tempfile::tempdir().unwrap();
    let app = printer_router(test_state(dir.path()));

    let (status, json) = post_print(&app, Body::from("plain text job"), "text/plain").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["file_number"], 1);
}

#[tokio::test]
async fn print_rejects_empty_content() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());
    let app = printer_router(state.clone());

    let (status, json) =
        post_print(&app, Body::from(r#"{"content": "   "}"#), "application/json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "No print content provided");

    // Nothing became visible
    assert!(!state.spooler.latest().exists);
}

#[tokio::test]
async fn last_qr_is_404_before_any_job() {
    let dir = tempfile::tempdir().unwrap();
    let app = printer_router(test_state(dir.path()));

    let (status, body) = get(&app, "/last_qr").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["exists"], false);
}

#[tokio::test]
async fn last_qr_reports_newest_job() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());
    let app = printer_router(state.clone());

    state.spooler.submit("Hello").unwrap();
    state.spooler.submit("World").unwrap();

    let (status, body) = get(&app, "/last_qr").await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["exists"], true);
    assert_eq!(json["file_number"], 2);
    assert_eq!(json["filename"], "2.png");
}

#[tokio::test]
async fn api_latest_always_answers_200() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());
    let app = display_router(state.clone());

    let (status, body) = get(&app, "/api/latest").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["exists"], false);

    state.spooler.submit("Hello").unwrap();

    let (status, body) = get(&app, "/api/latest").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["exists"], true);
    assert_eq!(json["file_number"], 1);
    assert_eq!(json["content_filename"], "1.txt");
}

#[tokio::test]
async fn content_and_qr_fetch_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());
    let app = display_router(state.clone());

    state.spooler.submit("Hello").unwrap();

    let (status, body) = get(&app, "/print_content/1").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["content"], "Hello");
    assert_eq!(json["filename"], "1.txt");

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/qr/1").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "image/png"
    );
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"));
}

#[tokio::test]
async fn unknown_ids_are_404() {
    let dir = tempfile::tempdir().unwrap();
    let app = display_router(test_state(dir.path()));

    let (status, _) = get(&app, "/print_content/99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(&app, "/qr/99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn index_serves_the_display_page() {
    let dir = tempfile::tempdir().unwrap();
    let app = display_router(test_state(dir.path()));

    let (status, body) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    let page = String::from_utf8(body).unwrap();
    assert!(page.contains("/api/latest"));
    assert!(page.contains("Waiting for print job"));
}

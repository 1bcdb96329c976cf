//! End-to-end API tests over the router with in-memory backends.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Request, StatusCode},
    Router,
};
use tower::ServiceExt;

use release_server_backend::api::{routes::create_router, AppState};
use release_server_backend::config::Config;
use release_server_backend::storage::memory::MemoryStorage;
use release_server_backend::store::memory::MemoryStore;

const BOUNDARY: &str = "X-RELEASE-SERVER-TEST-BOUNDARY";

fn test_config() -> Config {
    Config {
        bind_address: "127.0.0.1:0".into(),
        log_level: "debug".into(),
        store_backend: "memory".into(),
        database_url: None,
        storage_backend: "memory".into(),
        storage_path: "/tmp/unused".into(),
        max_upload_bytes: 16 * 1024 * 1024,
        upload_timeout_secs: 30,
    }
}

fn test_app() -> Router {
    let state = Arc::new(AppState::new(
        test_config(),
        Arc::new(MemoryStore::new()),
        Arc::new(MemoryStorage::new()),
    ));
    create_router(state)
}

fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> (String, Vec<u8>) {
    let mut body: Vec<u8> = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    if let Some((filename, content)) = file {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n",
                BOUNDARY, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    (
        format!("multipart/form-data; boundary={}", BOUNDARY),
        body,
    )
}

async fn create_release(app: &Router, name: &str, channel: &str) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/releases")
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(format!(
                    r#"{{"name":"{}","channel":"{}"}}"#,
                    name, channel
                )))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

async fn publish(
    app: &Router,
    release_ref: &str,
    platform: &str,
    filename: &str,
    content: &[u8],
) -> (StatusCode, String) {
    let (content_type, body) = multipart_body(
        &[("release", release_ref), ("platform", platform)],
        Some((filename, content)),
    );
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/assets")
                .header(CONTENT_TYPE, content_type)
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn health_returns_fixed_liveness_response() {
    let app = test_app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn publish_then_download_roundtrip() {
    let app = test_app();
    create_release(&app, "1.0.0", "stable").await;

    // Release id defaults to {name}_{flavor}; publish uses the bare name and
    // relies on the `_default` fallback.
    let (status, body) = publish(&app, "1.0.0", "windows_64", "Setup.exe", b"installer bytes").await;
    assert_eq!(status, StatusCode::OK, "publish failed: {}", body);
    assert!(body.contains("\"id\":\"1.0.0_default_windows_64_exe\""));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/download/1.0.0/windows_64")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(disposition, "attachment; filename=\"Setup.exe\"");

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(bytes.as_ref(), b"installer bytes");
}

#[tokio::test]
async fn download_by_channel_serves_latest_semantic_version() {
    let app = test_app();
    create_release(&app, "1.0.0", "stable").await;
    create_release(&app, "1.2.0", "stable").await;

    publish(&app, "1.0.0", "linux_64", "app.AppImage", b"old").await;
    publish(&app, "1.2.0", "linux_64", "app.AppImage", b"new").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/download/channel/stable/linux_64")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(bytes.as_ref(), b"new");
}

#[tokio::test]
async fn miss_returns_404_with_diagnostic_context() {
    let app = test_app();
    create_release(&app, "1.0.0", "stable").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/download/latest/osx_64?filetype=dmg")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(body.contains("default flavor"), "body: {}", body);
    assert!(body.contains("osx_64"), "body: {}", body);
    assert!(body.contains(".dmg"), "body: {}", body);
}

#[tokio::test]
async fn reserved_manifest_upload_is_rejected() {
    let app = test_app();
    create_release(&app, "1.0.0", "stable").await;

    let (status, body) = publish(&app, "1.0.0", "windows_64", "RELEASES", b"forged").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("BAD_REQUEST"));
}

#[tokio::test]
async fn publish_to_unknown_release_is_404() {
    let app = test_app();
    let (status, _) = publish(&app, "9.9.9", "windows_64", "app.zip", b"bytes").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_asset_then_delete_again_is_404() {
    let app = test_app();
    create_release(&app, "1.0.0", "stable").await;
    let (status, _) = publish(&app, "1.0.0", "windows_64", "app.zip", b"bytes").await;
    assert_eq!(status, StatusCode::OK);

    let id = "1.0.0_default_windows_64_zip";

    let first = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/assets/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/assets/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::NOT_FOUND);

    // The backing bytes are gone along with the record.
    let download = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/download/1.0.0/windows_64")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(download.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn resolve_only_reports_release_name_without_bytes() {
    let app = test_app();
    create_release(&app, "3.1.0", "stable").await;
    publish(&app, "3.1.0", "osx_64", "app.dmg", b"disk image").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/resolve?channel=stable&platform=osx_64")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(body.contains("\"version\":\"3.1.0\""), "body: {}", body);
}

#[tokio::test]
async fn platform_detection_failure_is_reported_not_hung() {
    let app = test_app();
    create_release(&app, "1.0.0", "stable").await;

    // No platform in the path and no recognizable User-Agent.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/download/latest")
                .header("user-agent", "curl/8.0.1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(body.contains("PLATFORM_DETECTION_ERROR"), "body: {}", body);
}

#[tokio::test]
async fn user_agent_detection_selects_platform() {
    let app = test_app();
    create_release(&app, "1.0.0", "stable").await;
    publish(&app, "1.0.0", "windows_64", "Setup.exe", b"installer").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/download/latest")
                .header(
                    "user-agent",
                    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36",
                )
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

//! End-to-end HTTP tests through the assembled router.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use glimpse_api::{create_api_router, ApiConfig, AppState};
use glimpse_core::{fingerprint, AnalysisEngine, AnalysisError, ServiceState};
use glimpse_engine::EngineAdapter;
use glimpse_storage::StorageHandles;
use glimpse_test_utils::engines::{CountingEngine, FailingEngine};
use glimpse_test_utils::fixtures::patterned_png;
use glimpse_test_utils::InMemoryStore;
use serde_json::{json, Value};
use tower::ServiceExt;

const BOUNDARY: &str = "glimpse-test-boundary";

struct TestApp {
    state: AppState,
    store: Arc<InMemoryStore>,
    engine: Arc<CountingEngine>,
}

impl TestApp {
    fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let engine = Arc::new(CountingEngine::new(
            json!({"keypoints": 5, "descriptors": [5, 128]}),
        ));
        let adapter = Arc::new(EngineAdapter::new(
            engine.clone() as Arc<dyn AnalysisEngine>,
            Arc::new(ServiceState::new()),
            Duration::from_secs(5),
        ));
        let state = AppState::new(
            ApiConfig::default(),
            StorageHandles::shared(store.clone()),
            adapter,
        );
        Self {
            state,
            store,
            engine,
        }
    }

    async fn ready() -> Self {
        let app = Self::new();
        app.state.engine.warmup().await.expect("warmup should succeed");
        app
    }

    fn router(&self) -> Router {
        create_api_router(self.state.clone())
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router()
            .oneshot(request)
            .await
            .expect("request should succeed");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn drain(&self) {
        self.state.processor.background().drain().await;
    }
}

fn multipart_body(
    field: &str,
    filename: Option<&str>,
    content_type: Option<&str>,
    data: &[u8],
) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", field);
    if let Some(name) = filename {
        disposition.push_str(&format!("; filename=\"{}\"", name));
    }
    body.extend_from_slice(disposition.as_bytes());
    body.extend_from_slice(b"\r\n");
    if let Some(ct) = content_type {
        body.extend_from_slice(format!("Content-Type: {}\r\n", ct).as_bytes());
    }
    body.extend_from_slice(b"\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn upload_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/process-image")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .expect("request should build")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request should build")
}

#[tokio::test]
async fn test_process_image_miss_then_hit() {
    let app = TestApp::ready().await;
    let png = patterned_png(11);

    let (status, first) = app
        .send(upload_request(multipart_body("file", Some("one.png"), Some("image/png"), &png)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["success"], true);
    assert_eq!(first["cache_hit"], false);
    assert_eq!(first["fingerprint"], fingerprint(&png).as_str());
    assert_eq!(first["filename"], "one.png");
    app.drain().await;

    let (status, second) = app
        .send(upload_request(multipart_body("file", Some("two.png"), Some("image/png"), &png)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["cache_hit"], true);
    assert_eq!(second["result"], first["result"]);
    assert_eq!(app.engine.analyze_calls(), 1);
}

#[tokio::test]
async fn test_non_image_upload_returns_400() {
    let app = TestApp::ready().await;
    let (status, body) = app
        .send(upload_request(multipart_body("file", Some("a.txt"), Some("text/plain"), b"hello")))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "INVALID_MEDIA_TYPE");
    assert_eq!(body["error"], "File must be an image");
    assert_eq!(app.engine.analyze_calls(), 0);
}

#[tokio::test]
async fn test_empty_upload_returns_400() {
    let app = TestApp::ready().await;
    let (status, body) = app
        .send(upload_request(multipart_body("file", Some("a.jpg"), Some("image/jpeg"), b"")))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "EMPTY_PAYLOAD");
}

#[tokio::test]
async fn test_missing_file_field_returns_422() {
    let app = TestApp::ready().await;
    let (status, body) = app
        .send(upload_request(multipart_body("other", None, None, b"value")))
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "MISSING_FIELD");
}

#[tokio::test]
async fn test_non_multipart_body_returns_422() {
    let app = TestApp::ready().await;
    let request = Request::builder()
        .method("POST")
        .uri("/process-image")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .expect("request should build");
    let (status, body) = app.send(request).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_not_ready_returns_503() {
    let app = TestApp::new();
    let (status, body) = app
        .send(upload_request(multipart_body(
            "file",
            Some("cold.png"),
            Some("image/png"),
            &patterned_png(12),
        )))
        .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "SERVICE_NOT_READY");
    assert_eq!(app.engine.analyze_calls(), 0);
}

#[tokio::test]
async fn test_oversized_upload_returns_413() {
    let store = Arc::new(InMemoryStore::new());
    let adapter = Arc::new(EngineAdapter::new(
        Arc::new(CountingEngine::new(json!({}))),
        Arc::new(ServiceState::new()),
        Duration::from_secs(5),
    ));
    adapter.warmup().await.expect("warmup should succeed");
    let config = ApiConfig {
        max_upload_bytes: 8,
        ..ApiConfig::default()
    };
    let router = create_api_router(AppState::new(config, StorageHandles::shared(store), adapter));

    let response = router
        .oneshot(upload_request(multipart_body(
            "file",
            Some("big.png"),
            Some("image/png"),
            &[7u8; 64],
        )))
        .await
        .expect("request should succeed");
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

async fn failing_app(error: AnalysisError) -> Router {
    let adapter = Arc::new(EngineAdapter::new(
        Arc::new(FailingEngine::with_analysis_error(error)),
        Arc::new(ServiceState::new()),
        Duration::from_secs(5),
    ));
    adapter.warmup().await.expect("warmup should succeed");
    let store = Arc::new(InMemoryStore::new());
    create_api_router(AppState::new(
        ApiConfig::default(),
        StorageHandles::shared(store),
        adapter,
    ))
}

async fn read_json(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.expect("request should succeed");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn test_analysis_failure_returns_short_message() {
    let router = failing_app(AnalysisError::Failed(
        "task 12 panicked with message \"attempt to subtract with overflow\"".to_string(),
    ))
    .await;
    let (status, body) = read_json(
        router,
        upload_request(multipart_body(
            "file",
            Some("p.png"),
            Some("image/png"),
            &patterned_png(15),
        )),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "PROCESSING_FAILED");
    assert_eq!(body["error"], "Processing failed: analysis failed");
    assert_eq!(body["details"]["kind"], "analysis_failed");
    let text = body.to_string();
    assert!(!text.contains("panicked"));
    assert!(!text.contains("overflow"));
}

#[tokio::test]
async fn test_undecodable_image_hides_decoder_text() {
    let router = failing_app(AnalysisError::UnsupportedImage(
        "Format error decoding Png: Invalid PNG signature.".to_string(),
    ))
    .await;
    let (status, body) = read_json(
        router,
        upload_request(multipart_body("file", Some("d.png"), Some("image/png"), b"not a png")),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Processing failed: image could not be decoded");
    assert_eq!(body["details"]["kind"], "unsupported_image");
    assert!(!body.to_string().contains("signature"));
}

#[tokio::test]
async fn test_check_status_tracks_warmup() {
    let app = TestApp::new();

    let (status, body) = app.send(get("/check-status")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service_ready"], true);
    assert_eq!(body["analysis_ready"], false);
    assert_eq!(body["warmup_completed"], false);
    assert!(body["uptime_seconds"].as_f64().expect("uptime should be a number") >= 0.0);

    app.state.engine.warmup().await.expect("warmup should succeed");
    let (_, body) = app.send(get("/check-status")).await;
    assert_eq!(body["analysis_ready"], true);
    assert_eq!(body["warmup_completed"], true);
}

#[tokio::test]
async fn test_root_lists_endpoints() {
    let app = TestApp::new();
    let (status, body) = app.send(get("/")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "running");
    let endpoints = body["endpoints"].as_array().expect("endpoints should be a list");
    assert!(endpoints.iter().any(|e| e == "/process-image"));
}

#[tokio::test]
async fn test_health_ready_follows_engine() {
    let app = TestApp::new();
    let (status, body) = app.send(get("/health/ready")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["details"]["analysis"]["status"], "unhealthy");

    app.state.engine.warmup().await.expect("warmup should succeed");
    let (status, body) = app.send(get("/health/ready")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, _) = app.send(get("/health/live")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_request_logs_newest_first() {
    let app = TestApp::ready().await;
    app.send(upload_request(multipart_body("file", Some("a.txt"), Some("text/plain"), b"x")))
        .await;
    app.drain().await;
    app.send(upload_request(multipart_body(
        "file",
        Some("b.png"),
        Some("image/png"),
        &patterned_png(13),
    )))
    .await;
    app.drain().await;

    let (status, body) = app.send(get("/request-logs?limit=10")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    let entries = body["entries"].as_array().expect("entries should be a list");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["filename"], "b.png");
    assert_eq!(entries[0]["status"], "success");
    assert_eq!(entries[1]["status"], "error");
    assert_eq!(app.store.audit_entries().len(), 2);

    let (status, _) = app.send(get("/request-logs?limit=0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_metrics_endpoint_exposes_image_outcomes() {
    let app = TestApp::ready().await;
    app.send(upload_request(multipart_body(
        "file",
        Some("m.png"),
        Some("image/png"),
        &patterned_png(14),
    )))
    .await;

    let response = app
        .router()
        .oneshot(get("/metrics"))
        .await
        .expect("request should succeed");
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    let text = String::from_utf8_lossy(&bytes);
    assert!(text.contains("glimpse_image_requests_total"));
}

#[cfg(feature = "openapi")]
#[tokio::test]
async fn test_openapi_document_served() {
    let app = TestApp::new();
    let (status, body) = app.send(get("/openapi.json")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/process-image"].is_object());
}

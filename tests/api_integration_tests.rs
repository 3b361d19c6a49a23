//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use mod_companion::{
    api::create_router,
    archive::{ArchiveContext, SevenZipBridge},
    cache::{EvictionPolicy, TtlCache},
    catalogue::{CacheOrchestrator, CatalogueClient, MemoryStore},
    clock::SystemClock,
    error::CatalogueError,
    AppState,
};
use serde_json::{json, Value};
use tower::ServiceExt;

// == Helper Functions ==

#[derive(Default)]
struct CountingClient {
    calls: AtomicUsize,
}

#[async_trait]
impl CatalogueClient for CountingClient {
    async fn call(
        &self,
        _api_key: &str,
        operation: &str,
        args: &[Value],
    ) -> Result<Value, CatalogueError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if operation == "getBroken" {
            return Err(CatalogueError::remote("503 Service Unavailable"));
        }
        Ok(json!({ "operation": operation, "args": args }))
    }
}

fn create_test_app(client: Arc<CountingClient>, temp_root: &Path) -> Router {
    create_test_app_with_origin(client, temp_root, None)
}

fn create_test_app_with_origin(
    client: Arc<CountingClient>,
    temp_root: &Path,
    allowed_origin: Option<&str>,
) -> Router {
    let catalogue = CacheOrchestrator::new(
        client,
        Arc::new(MemoryStore::new()),
        TtlCache::new("catalogue", Duration::from_secs(300), EvictionPolicy::Renew),
        Arc::new(SystemClock),
    );
    let archives = ArchiveContext::new(Arc::new(SevenZipBridge::new("7za")), temp_root);
    create_router(AppState::new(catalogue, archives), allowed_origin)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn write_zip(path: &Path, files: &[(&str, &[u8])]) {
    let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
    for (name, bytes) in files {
        writer
            .start_file(*name, zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(bytes).unwrap();
    }
    writer.finish().unwrap();
}

// == Catalogue Endpoint Tests ==

#[tokio::test]
async fn test_catalogue_call_is_cached() {
    let dir = tempfile::tempdir().unwrap();
    let client = Arc::new(CountingClient::default());
    let app = create_test_app(client.clone(), dir.path());
    let body = json!({ "api_key": "key", "args": ["skyrimspecialedition", 3863] });

    let response = app
        .clone()
        .oneshot(post_json("/catalogue/getModInfo", body.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let first = body_to_json(response.into_body()).await;
    assert_eq!(first["result"]["operation"], "getModInfo");
    assert!(first["result"]["cache_time"].is_u64());

    let response = app
        .oneshot(post_json("/catalogue/getModInfo", body))
        .await
        .unwrap();
    let second = body_to_json(response.into_body()).await;

    assert_eq!(first, second);
    assert_eq!(client.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_catalogue_failure_is_null_result() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_test_app(Arc::new(CountingClient::default()), dir.path());

    let response = app
        .oneshot(post_json("/catalogue/getBroken", json!({ "api_key": "key" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert!(json["result"].is_null());
}

#[tokio::test]
async fn test_catalogue_rejects_empty_api_key() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_test_app(Arc::new(CountingClient::default()), dir.path());

    let response = app
        .oneshot(post_json("/catalogue/getModInfo", json!({ "api_key": "" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("API key"));
}

// == Archive Endpoint Tests ==

#[tokio::test]
async fn test_list_archive_entries() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mod.zip");
    write_zip(&path, &[("a/b.txt", b"bee")]);
    let app = create_test_app(Arc::new(CountingClient::default()), dir.path());

    let response = app
        .oneshot(post_json(
            "/archives/entries",
            json!({ "path": path.display().to_string() }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(
        json["entries"],
        json!([
            { "name": "a/", "is_directory": true, "size": 0 },
            { "name": "a/b.txt", "is_directory": false, "size": 3 }
        ])
    );
}

#[tokio::test]
async fn test_extract_archive() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mod.zip");
    write_zip(&path, &[("Data/plugin.esp", b"TES4"), ("readme.txt", b"hi")]);
    let out = dir.path().join("out");
    let app = create_test_app(Arc::new(CountingClient::default()), dir.path());

    let response = app
        .oneshot(post_json(
            "/archives/extract",
            json!({
                "path": path.display().to_string(),
                "output": out.display().to_string(),
                "ignores": ["readme.txt"]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["extracted"], 2);
    assert_eq!(std::fs::read(out.join("Data/plugin.esp")).unwrap(), b"TES4");
    assert!(!out.join("readme.txt").exists());
}

#[tokio::test]
async fn test_extract_unsupported_format() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_test_app(Arc::new(CountingClient::default()), dir.path());

    let response = app
        .oneshot(post_json(
            "/archives/extract",
            json!({ "path": "mod.tar", "output": "/tmp/out" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["error"], "Unsupported archive format: tar");
}

#[tokio::test]
async fn test_extract_unreadable_archive_fails() {
    let dir = tempfile::tempdir().unwrap();
    let corrupt = dir.path().join("corrupt.zip");
    std::fs::write(&corrupt, b"PK garbage").unwrap();
    let out = dir.path().join("out");
    let app = create_test_app(Arc::new(CountingClient::default()), dir.path());

    for path in [dir.path().join("missing.zip"), corrupt] {
        let response = app
            .clone()
            .oneshot(post_json(
                "/archives/extract",
                json!({
                    "path": path.display().to_string(),
                    "output": out.display().to_string()
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_to_json(response.into_body()).await;
        assert!(json["error"].is_string());
    }
    assert!(!out.exists());
}

// == CORS Tests ==

fn preflight(origin: &str) -> Request<Body> {
    Request::builder()
        .method("OPTIONS")
        .uri("/archives/extract")
        .header("origin", origin)
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_no_cross_origin_access_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_test_app(Arc::new(CountingClient::default()), dir.path());

    let response = app.oneshot(preflight("https://evil.example")).await.unwrap();

    assert!(response
        .headers()
        .get("access-control-allow-origin")
        .is_none());
}

#[tokio::test]
async fn test_only_configured_origin_is_allowed() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_test_app_with_origin(
        Arc::new(CountingClient::default()),
        dir.path(),
        Some("http://localhost:5173"),
    );

    let allowed = app
        .clone()
        .oneshot(preflight("http://localhost:5173"))
        .await
        .unwrap();
    assert_eq!(
        allowed.headers().get("access-control-allow-origin").unwrap(),
        "http://localhost:5173"
    );

    let refused = app.oneshot(preflight("https://evil.example")).await.unwrap();
    assert!(refused
        .headers()
        .get("access-control-allow-origin")
        .is_none());
}

// == Stats / Health Endpoint Tests ==

#[tokio::test]
async fn test_stats_endpoint() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_test_app(Arc::new(CountingClient::default()), dir.path());
    let body = json!({ "api_key": "key", "args": [1] });

    // Durable hits never reach the in-memory tier, so one miss and no hits.
    for _ in 0..2 {
        app.clone()
            .oneshot(post_json("/catalogue/getModFiles", body.clone()))
            .await
            .unwrap();
    }

    let response = app
        .oneshot(Request::builder().uri("/stats").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["cache"], "catalogue");
    assert_eq!(json["misses"], 1);
    assert_eq!(json["hits"], 0);
    assert_eq!(json["total_entries"], 1);
}

#[tokio::test]
async fn test_health_endpoint() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_test_app(Arc::new(CountingClient::default()), dir.path());

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
    assert!(json.get("timestamp").is_some());
}

#[tokio::test]
async fn test_invalid_json_request() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_test_app(Arc::new(CountingClient::default()), dir.path());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/archives/entries")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

use super::*;
use crate::jobs::test_helpers::{Controller, ScriptedEngine, create_test_service};
use axum::body::Body;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::response::Response;
use std::time::Duration;
use tower::ServiceExt;

mod media;

struct TestApp {
    router: Router,
    jobs: JobService,
    engine: Arc<ScriptedEngine>,
    controller: Controller,
    _temp_dir: tempfile::TempDir,
}

async fn create_test_app() -> TestApp {
    create_test_app_with(|_| {}).await
}

async fn create_test_app_with(configure: impl FnOnce(&mut Config)) -> TestApp {
    let (jobs, engine, controller, temp_dir) = create_test_service().await;
    let mut config = (*jobs.config()).clone();
    configure(&mut config);
    let router = create_router(jobs.clone(), Arc::new(config));
    TestApp {
        router,
        jobs,
        engine,
        controller,
        _temp_dir: temp_dir,
    }
}

async fn send(router: &Router, request: Request<Body>) -> Response {
    router.clone().oneshot(request).await.unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn server_serves_and_shuts_down_gracefully() {
    let app = create_test_app().await;
    let mut config = (*app.jobs.config()).clone();
    config.server.api.bind_address = "127.0.0.1:0".parse().unwrap(); // OS assigns a free port

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(serve_with_shutdown(
        app.jobs.clone(),
        Arc::new(config),
        async move {
            let _ = stop_rx.await;
        },
    ));

    tokio::time::sleep(Duration::from_millis(50)).await;
    stop_tx.send(()).unwrap();

    let result = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server did not stop")
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn cors_headers_present_when_enabled() {
    let app = create_test_app().await;

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = send(&app.router, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .contains_key("access-control-allow-origin")
    );
}

#[tokio::test]
async fn cors_restricted_to_listed_origins() {
    let app = create_test_app_with(|c| {
        c.server.api.cors_origins = vec!["http://allowed.example".into()];
    })
    .await;

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://other.example")
        .body(Body::empty())
        .unwrap();
    let response = send(&app.router, request).await;
    assert!(
        !response
            .headers()
            .contains_key("access-control-allow-origin")
    );

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://allowed.example")
        .body(Body::empty())
        .unwrap();
    let response = send(&app.router, request).await;
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "http://allowed.example"
    );
}

#[tokio::test]
async fn cors_disabled_omits_headers() {
    let app = create_test_app_with(|c| c.server.api.cors_enabled = false).await;

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = send(&app.router, request).await;
    assert!(
        !response
            .headers()
            .contains_key("access-control-allow-origin")
    );
}

#[tokio::test]
async fn api_key_guards_routes_but_not_health() {
    let app = create_test_app_with(|c| c.server.api.api_key = Some("s3cret".into())).await;

    let response = send(&app.router, get("/supported_sites")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/supported_sites")
        .header("X-Api-Key", "s3cret")
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(&app.router, request).await.status(), StatusCode::OK);

    assert_eq!(send(&app.router, get("/health")).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn swagger_ui_can_be_disabled() {
    let enabled = create_test_app().await;
    let response = send(&enabled.router, get("/api-docs/openapi.json")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let disabled = create_test_app_with(|c| c.server.api.swagger_ui = false).await;
    let response = send(&disabled.router, get("/api-docs/openapi.json")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

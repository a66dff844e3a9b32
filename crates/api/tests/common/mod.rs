#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use pikwy_api::config::ServerConfig;
use pikwy_api::generator::{ContentGenerator, PlaceholderGenerator};
use pikwy_api::router::build_app_router;
use pikwy_api::state::AppState;
use pikwy_api::store::JobStore;

/// Token attached by the request helpers.
pub const TEST_TOKEN: &str = "test-token";

/// Build a test `ServerConfig` with a short processing delay.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:8080".to_string()],
        processing_delay_ms: 50,
        adapter_timeout_secs: 5,
        ..ServerConfig::default()
    }
}

/// A running application: the router plus handles to its store and runner.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<JobStore>,
    pub shutdown: CancellationToken,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Build the full application router with all middleware layers and a
/// running job runner, using the placeholder generator.
pub fn build_test_app(config: ServerConfig) -> TestApp {
    build_test_app_with(config, Arc::new(PlaceholderGenerator::new()))
}

pub fn build_test_app_with(config: ServerConfig, generator: Arc<dyn ContentGenerator>) -> TestApp {
    let shutdown = CancellationToken::new();
    let (store, runner) = JobStore::start(config.store_settings(), generator, shutdown.clone());
    tokio::spawn(runner.run());

    let state = AppState {
        store: Arc::clone(&store),
        config: Arc::new(config.clone()),
    };

    TestApp {
        router: build_app_router(state, &config),
        store,
        shutdown,
    }
}

/// Send an authenticated request.
pub async fn send(app: &TestApp, method: Method, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("Authorization", format!("Bearer {TEST_TOKEN}"))
        .body(Body::empty())
        .unwrap();
    app.router.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &TestApp, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri).await
}

pub async fn post(app: &TestApp, uri: &str) -> Response<Body> {
    send(app, Method::POST, uri).await
}

/// Send a request without an `Authorization` header.
pub async fn send_anonymous(app: &TestApp, method: Method, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.router.clone().oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Submit a job and return its id.
pub async fn submit(app: &TestApp, prompt: &str) -> String {
    let response = get(app, &format!("/api/queue-generation?prompt={prompt}")).await;
    assert_eq!(response.status(), 200);
    body_json(response).await["jobId"]
        .as_str()
        .expect("jobId must be a string")
        .to_string()
}

/// Poll the status endpoint until the job leaves `processing`.
pub async fn poll_until_settled(app: &TestApp, job_id: &str) -> serde_json::Value {
    for _ in 0..100 {
        let json = body_json(get(app, &format!("/api/job-status?jobId={job_id}")).await).await;
        if json["status"] != "processing" {
            return json;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("job {job_id} never settled");
}

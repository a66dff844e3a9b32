#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use pikwy_api::config::ServerConfig;
use pikwy_api::generator::{ContentGenerator, PlaceholderGenerator};
use pikwy_api::router::build_app_router;
use pikwy_api::state::AppState;
use pikwy_api::store::JobStore;
use pikwy_poller::auth::StaticToken;
use pikwy_poller::client::BackendClient;
use pikwy_poller::poller::JobPoller;

pub const TEST_TOKEN: &str = "poller-test-token";

/// Server config with a short processing delay.
pub fn server_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        processing_delay_ms: 100,
        adapter_timeout_secs: 5,
        ..ServerConfig::default()
    }
}

/// A backend listening on an ephemeral localhost port.
pub struct TestServer {
    pub base_url: String,
    pub store: Arc<JobStore>,
    shutdown: CancellationToken,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

impl TestServer {
    pub fn poller(&self, poll_interval: Duration, max_attempts: u32) -> JobPoller {
        self.poller_with_token(TEST_TOKEN, poll_interval, max_attempts)
    }

    pub fn poller_with_token(
        &self,
        token: &str,
        poll_interval: Duration,
        max_attempts: u32,
    ) -> JobPoller {
        let client = BackendClient::new(&self.base_url, Arc::new(StaticToken::new(token)));
        JobPoller::new(client, poll_interval, max_attempts)
    }
}

pub async fn spawn_server(config: ServerConfig) -> TestServer {
    spawn_server_with(config, Arc::new(PlaceholderGenerator::new())).await
}

pub async fn spawn_server_with(
    config: ServerConfig,
    generator: Arc<dyn ContentGenerator>,
) -> TestServer {
    let shutdown = CancellationToken::new();
    let (store, runner) = JobStore::start(config.store_settings(), generator, shutdown.clone());
    tokio::spawn(runner.run());

    let state = AppState {
        store: Arc::clone(&store),
        config: Arc::new(config.clone()),
    };
    let app = build_app_router(state, &config);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server_shutdown = shutdown.clone();
    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { server_shutdown.cancelled().await })
            .await
            .unwrap();
    });

    TestServer {
        base_url: format!("http://{addr}"),
        store,
        shutdown,
    }
}

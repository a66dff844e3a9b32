use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pikwy_api::config::ServerConfig;
use pikwy_api::generator;
use pikwy_api::router::build_app_router;
use pikwy_api::state::AppState;
use pikwy_api::store::JobStore;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = config.port,
        initial_credits = config.initial_credits,
        processing_delay_ms = config.processing_delay_ms,
        worker_concurrency = config.worker_concurrency,
        require_auth = config.require_auth,
        "Loaded server configuration",
    );

    let generator =
        generator::from_kind(&config.generator).expect("Failed to configure content generator");
    tracing::info!(generator = generator.name(), "Content generator configured");

    let (store, runner) =
        JobStore::start(config.store_settings(), generator, CancellationToken::new());
    let runner_handle = tokio::spawn(runner.run());

    let app = build_app_router(
        AppState {
            store: Arc::clone(&store),
            config: Arc::new(config.clone()),
        },
        &config,
    );

    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // HTTP has drained; queued jobs are abandoned with the process.
    store.shutdown();
    stop_runner(runner_handle, Duration::from_secs(config.shutdown_timeout_secs)).await;
    tracing::info!("Shutdown complete");
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pikwy_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn stop_runner(handle: JoinHandle<()>, grace: Duration) {
    match tokio::time::timeout(grace, handle).await {
        Ok(Ok(())) => tracing::info!("Job runner stopped"),
        Ok(Err(e)) => tracing::error!(error = %e, "Job runner task failed"),
        Err(_) => tracing::warn!(?grace, "Job runner did not stop in time"),
    }
}

/// Resolves on SIGINT, or SIGTERM on Unix.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate()).expect("Failed to install SIGTERM handler");
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result.expect("Failed to install Ctrl-C handler");
                tracing::info!(signal = "SIGINT", "Shutting down");
            }
            _ = sigterm.recv() => tracing::info!(signal = "SIGTERM", "Shutting down"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
        tracing::info!(signal = "ctrl-c", "Shutting down");
    }
}

//! Poller against a live backend on an ephemeral port.

mod common;

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use async_trait::async_trait;
use pikwy_api::generator::{ContentGenerator, GenerationError};
use pikwy_core::job::{GeneratedImage, GenerationRequest};
use pikwy_core::types::JobId;
use tokio_util::sync::CancellationToken;

use common::{server_config, spawn_server, spawn_server_with};
use pikwy_poller::error::{BackendError, PollError};

const FAST: Duration = Duration::from_millis(25);

#[tokio::test]
async fn generate_and_wait_returns_images_and_charged_balance() {
    let server = spawn_server(server_config()).await;
    let poller = server.poller(FAST, 200);

    let request = GenerationRequest::new("example.com").with_count(2);
    let (job_id, outcome) = poller
        .generate_and_wait(&request, &CancellationToken::new())
        .await
        .unwrap();

    assert!(!job_id.as_str().is_empty());
    assert_eq!(outcome.images.len(), 2);
    assert!(outcome.images.iter().all(|i| i.label == "example.com"));
    assert_eq!(outcome.credits, 9);
    assert_eq!(poller.credits().await.unwrap(), 9);
}

#[tokio::test]
async fn cancelled_job_reports_not_found_and_is_free() {
    let mut config = server_config();
    config.processing_delay_ms = 2_000;
    let server = spawn_server(config).await;
    let poller = server.poller(FAST, 200);

    let job_id = poller
        .generate(&GenerationRequest::new("example.com"))
        .await
        .unwrap();

    let token = CancellationToken::new();
    poller.cancel(&job_id, &token).await.unwrap();
    assert!(token.is_cancelled());

    let result = poller
        .await_completion(&job_id, &CancellationToken::new())
        .await;
    assert_matches!(result, Err(PollError::JobNotFound));
    assert_eq!(poller.credits().await.unwrap(), 10);
}

#[tokio::test]
async fn second_cancel_fails() {
    let mut config = server_config();
    config.processing_delay_ms = 2_000;
    let server = spawn_server(config).await;
    let poller = server.poller(FAST, 200);

    let job_id = poller
        .generate(&GenerationRequest::new("example.com"))
        .await
        .unwrap();

    poller.cancel(&job_id, &CancellationToken::new()).await.unwrap();
    let second = poller.cancel(&job_id, &CancellationToken::new()).await;
    assert_matches!(
        second,
        Err(PollError::CancelFailed(BackendError::Status { status: 404, .. }))
    );
}

#[tokio::test]
async fn unknown_job_is_not_found() {
    let server = spawn_server(server_config()).await;
    let poller = server.poller(FAST, 5);

    let result = poller
        .await_completion(&JobId::from("doesnotexist"), &CancellationToken::new())
        .await;
    assert_matches!(result, Err(PollError::JobNotFound));
}

#[tokio::test]
async fn polling_gives_up_after_max_attempts() {
    let mut config = server_config();
    config.processing_delay_ms = 10_000;
    let server = spawn_server(config).await;
    let poller = server.poller(Duration::from_millis(10), 3);

    let job_id = poller
        .generate(&GenerationRequest::new("example.com"))
        .await
        .unwrap();

    let result = poller
        .await_completion(&job_id, &CancellationToken::new())
        .await;
    assert_matches!(result, Err(PollError::Timeout { attempts: 3 }));
}

#[tokio::test]
async fn firing_the_token_stops_polling() {
    let mut config = server_config();
    config.processing_delay_ms = 10_000;
    let server = spawn_server(config).await;
    let poller = server.poller(Duration::from_millis(50), 1_000);

    let job_id = poller
        .generate(&GenerationRequest::new("example.com"))
        .await
        .unwrap();

    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(120)).await;
        canceller.cancel();
    });

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        poller.await_completion(&job_id, &token),
    )
    .await
    .expect("poller should stop promptly");
    assert_matches!(result, Err(PollError::Cancelled));
}

#[tokio::test]
async fn zero_credits_is_insufficient() {
    let mut config = server_config();
    config.initial_credits = 0;
    let server = spawn_server(config).await;
    let poller = server.poller(FAST, 5);

    let result = poller.generate(&GenerationRequest::new("example.com")).await;
    assert_matches!(result, Err(PollError::InsufficientCredits));
    assert_eq!(server.store.credits(), 0);
}

#[tokio::test]
async fn blank_prompt_is_invalid() {
    let server = spawn_server(server_config()).await;
    let poller = server.poller(FAST, 5);

    let result = poller.generate(&GenerationRequest::new("   ")).await;
    assert_matches!(result, Err(PollError::InvalidRequest(msg)) if msg == "Missing prompt parameter.");
}

#[tokio::test]
async fn purchase_adds_a_bundle() {
    let server = spawn_server(server_config()).await;
    let poller = server.poller(FAST, 5);

    assert_eq!(poller.purchase_credits().await.unwrap(), 20);
    assert_eq!(poller.credits().await.unwrap(), 20);
}

#[tokio::test]
async fn missing_token_is_rejected_locally() {
    let server = spawn_server(server_config()).await;
    let poller = server.poller_with_token("", FAST, 5);

    let result = poller.credits().await;
    assert_matches!(result, Err(PollError::Backend(BackendError::Token(_))));
}

#[tokio::test]
async fn authentication_status_reports_token() {
    let server = spawn_server(server_config()).await;
    assert!(server
        .poller(FAST, 5)
        .authentication_status()
        .await
        .unwrap());
}

struct BrokenGenerator;

#[async_trait]
impl ContentGenerator for BrokenGenerator {
    fn name(&self) -> &'static str {
        "broken"
    }

    async fn generate(
        &self,
        _request: &GenerationRequest,
    ) -> Result<Vec<GeneratedImage>, GenerationError> {
        Err(GenerationError::InvalidTarget("provider unavailable".into()))
    }
}

#[tokio::test]
async fn generator_failure_surfaces_as_generation_failed() {
    let server = spawn_server_with(server_config(), Arc::new(BrokenGenerator)).await;
    let poller = server.poller(FAST, 200);

    let result = poller
        .generate_and_wait(&GenerationRequest::new("example.com"), &CancellationToken::new())
        .await;
    assert_matches!(result, Err(PollError::GenerationFailed(_)));
    assert_eq!(server.store.credits(), 10);
}

//! Background job runner.
//!
//! Receives job ids from the store and executes each one on its own Tokio
//! task, with at most `worker_concurrency` jobs generating at once. A job
//! waits until its processing delay has elapsed, calls the content
//! generator under the adapter timeout, and reports the outcome back to the
//! store. The job's cancellation token aborts both waits.

use std::sync::Arc;

use pikwy_core::job::JobResult;
use pikwy_core::types::JobId;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::generator::{ContentGenerator, GenerationError};
use crate::store::{JobStore, Transition};

/// Drives queued jobs to a terminal state.
pub struct JobRunner {
    store: Arc<JobStore>,
    generator: Arc<dyn ContentGenerator>,
    receiver: mpsc::UnboundedReceiver<JobId>,
    shutdown: CancellationToken,
}

impl JobRunner {
    pub(crate) fn new(
        store: Arc<JobStore>,
        generator: Arc<dyn ContentGenerator>,
        receiver: mpsc::UnboundedReceiver<JobId>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            store,
            generator,
            receiver,
            shutdown,
        }
    }

    /// Run until the shutdown token is cancelled.
    ///
    /// In-flight jobs observe the same token through their child tokens and
    /// stop without a transition; they are awaited before returning.
    pub async fn run(mut self) {
        let concurrency = self.store.settings().worker_concurrency;
        let permits = Arc::new(Semaphore::new(concurrency));
        let mut tasks = JoinSet::new();

        tracing::info!(
            concurrency,
            generator = self.generator.name(),
            "Job runner started",
        );

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    tracing::info!("Job runner shutting down");
                    break;
                }
                next = self.receiver.recv() => {
                    let Some(id) = next else {
                        tracing::info!("Job queue closed, runner exiting");
                        break;
                    };
                    let store = Arc::clone(&self.store);
                    let generator = Arc::clone(&self.generator);
                    let permits = Arc::clone(&permits);
                    tasks.spawn(async move {
                        process_job(store, generator, permits, id).await;
                    });
                }
                // Reap finished tasks so the set does not grow unbounded.
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(e) = joined {
                        tracing::error!(error = %e, "Job task panicked");
                    }
                }
            }
        }

        while tasks.join_next().await.is_some() {}
    }
}

/// Execute one job from claim to terminal state.
async fn process_job(
    store: Arc<JobStore>,
    generator: Arc<dyn ContentGenerator>,
    permits: Arc<Semaphore>,
    id: JobId,
) {
    let Some(job) = store.claim(&id) else {
        tracing::debug!(job_id = %id, "Job no longer queued, skipping");
        return;
    };

    tokio::select! {
        _ = job.cancel.cancelled() => {
            tracing::debug!(job_id = %id, "Job cancelled before processing");
            return;
        }
        _ = tokio::time::sleep_until(job.ready_at) => {}
    }

    let _permit = tokio::select! {
        _ = job.cancel.cancelled() => return,
        permit = permits.acquire_owned() => match permit {
            Ok(permit) => permit,
            Err(_) => return,
        },
    };

    if !store.is_queued(&id) {
        return;
    }

    let timeout = store.settings().adapter_timeout;
    tracing::debug!(job_id = %id, generator = generator.name(), "Generating content");

    let outcome = tokio::select! {
        _ = job.cancel.cancelled() => {
            tracing::debug!(job_id = %id, "Job cancelled during generation, result abandoned");
            return;
        }
        outcome = tokio::time::timeout(timeout, generator.generate(&job.request)) => outcome,
    };

    let transition = match outcome {
        Ok(Ok(images)) => store.complete(&id, JobResult::labelled(&job.request.prompt, images)),
        Ok(Err(e)) => store.fail(&id, e.to_string()),
        Err(_) => store.fail(&id, GenerationError::TimedOut(timeout).to_string()),
    };

    if transition == Transition::Skipped {
        tracing::debug!(job_id = %id, "Job left the queue while generating");
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use pikwy_core::job::{GeneratedImage, GenerationRequest, Rendition};
    use pikwy_core::protocol::JobStatusResponse;
    use tokio::sync::Notify;

    use super::*;
    use crate::generator::{GenerationError, PlaceholderGenerator};
    use crate::store::StoreSettings;

    fn settings(delay_ms: u64, timeout_ms: u64) -> StoreSettings {
        StoreSettings {
            initial_credits: 10,
            credits_in_bundle: 10,
            processing_delay: Duration::from_millis(delay_ms),
            adapter_timeout: Duration::from_millis(timeout_ms),
            worker_concurrency: 4,
        }
    }

    fn spawn(
        settings: StoreSettings,
        generator: Arc<dyn ContentGenerator>,
    ) -> (Arc<JobStore>, CancellationToken, tokio::task::JoinHandle<()>) {
        let shutdown = CancellationToken::new();
        let (store, runner) = JobStore::start(settings, generator, shutdown.clone());
        let handle = tokio::spawn(runner.run());
        (store, shutdown, handle)
    }

    async fn wait_until_terminal(store: &JobStore, id: &JobId) -> JobStatusResponse {
        for _ in 0..200 {
            let status = store.status(id.as_str()).unwrap();
            if status != JobStatusResponse::Processing {
                return status;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("job {id} never left processing");
    }

    /// Blocks inside `generate` until released, then succeeds.
    struct GatedGenerator {
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl ContentGenerator for GatedGenerator {
        fn name(&self) -> &'static str {
            "gated"
        }

        async fn generate(
            &self,
            _request: &GenerationRequest,
        ) -> Result<Vec<GeneratedImage>, GenerationError> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(vec![GeneratedImage {
                label: String::new(),
                fullsize: Rendition {
                    width: 1,
                    height: 1,
                    url: "https://cdn.example/g.jpg".into(),
                },
                thumbnail: Rendition {
                    width: 1,
                    height: 1,
                    url: "https://cdn.example/g_t.jpg".into(),
                },
            }])
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl ContentGenerator for FailingGenerator {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn generate(
            &self,
            _request: &GenerationRequest,
        ) -> Result<Vec<GeneratedImage>, GenerationError> {
            Err(GenerationError::InvalidTarget("upstream returned 500".into()))
        }
    }

    #[tokio::test]
    async fn job_completes_after_delay_and_charges_once() {
        let (store, shutdown, handle) = spawn(settings(20, 1000), Arc::new(PlaceholderGenerator));
        let id = store.submit(GenerationRequest::new("example.com")).unwrap();

        assert_eq!(store.status(id.as_str()).unwrap(), JobStatusResponse::Processing);

        match wait_until_terminal(&store, &id).await {
            JobStatusResponse::Completed { images, credits } => {
                assert_eq!(images.len(), 1);
                assert_eq!(images[0].label, "example.com");
                assert_eq!(credits, 9);
            }
            other => panic!("expected completed, got {other:?}"),
        }
        assert_eq!(store.credits(), 9);

        shutdown.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn cancel_before_delay_prevents_generation() {
        let (store, shutdown, handle) = spawn(settings(200, 1000), Arc::new(PlaceholderGenerator));
        let id = store.submit(GenerationRequest::new("example.com")).unwrap();
        store.cancel(id.as_str()).unwrap();

        tokio::time::sleep(Duration::from_millis(350)).await;
        assert_eq!(store.status(id.as_str()).unwrap(), JobStatusResponse::Cancelled);
        assert_eq!(store.credits(), 10);

        shutdown.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn cancel_during_generation_wins_and_result_is_dropped() {
        let generator = Arc::new(GatedGenerator {
            entered: Notify::new(),
            release: Notify::new(),
        });
        let (store, shutdown, handle) = spawn(settings(0, 5000), generator.clone());
        let id = store.submit(GenerationRequest::new("example.com")).unwrap();

        generator.entered.notified().await;
        store.cancel(id.as_str()).unwrap();
        generator.release.notify_one();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(store.status(id.as_str()).unwrap(), JobStatusResponse::Cancelled);
        assert_eq!(store.credits(), 10);

        shutdown.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn generator_error_marks_job_failed_without_charge() {
        let (store, shutdown, handle) = spawn(settings(0, 1000), Arc::new(FailingGenerator));
        let id = store.submit(GenerationRequest::new("example.com")).unwrap();

        match wait_until_terminal(&store, &id).await {
            JobStatusResponse::Failed { error } => assert!(error.contains("upstream returned 500")),
            other => panic!("expected failed, got {other:?}"),
        }
        assert_eq!(store.credits(), 10);

        shutdown.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn generator_timeout_marks_job_failed() {
        let generator = Arc::new(GatedGenerator {
            entered: Notify::new(),
            release: Notify::new(),
        });
        let (store, shutdown, handle) = spawn(settings(0, 30), generator);
        let id = store.submit(GenerationRequest::new("example.com")).unwrap();

        match wait_until_terminal(&store, &id).await {
            JobStatusResponse::Failed { error } => assert_eq!(
                error,
                GenerationError::TimedOut(Duration::from_millis(30)).to_string()
            ),
            other => panic!("expected failed, got {other:?}"),
        }
        assert_eq!(store.credits(), 10);

        shutdown.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn shutdown_leaves_pending_jobs_queued() {
        let (store, shutdown, handle) = spawn(settings(10_000, 1000), Arc::new(PlaceholderGenerator));
        let id = store.submit(GenerationRequest::new("example.com")).unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("runner should stop promptly")
            .unwrap();

        assert_eq!(store.status(id.as_str()).unwrap(), JobStatusResponse::Processing);
        assert_eq!(store.credits(), 10);
    }

    #[tokio::test]
    async fn many_jobs_each_charge_one_credit() {
        let (store, shutdown, handle) = spawn(settings(5, 1000), Arc::new(PlaceholderGenerator));
        let ids: Vec<JobId> = (0..6)
            .map(|i| store.submit(GenerationRequest::new(format!("p{i}"))).unwrap())
            .collect();

        for id in &ids {
            wait_until_terminal(&store, id).await;
        }
        assert_eq!(store.credits(), 4);

        shutdown.cancel();
        handle.await.unwrap();
    }
}

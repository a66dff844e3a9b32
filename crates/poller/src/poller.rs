//! Submit / poll / cancel workflow over [`BackendClient`].
//!
//! Polling is a bounded loop: one outstanding status request at a time, a
//! fixed sleep between attempts, and a [`CancellationToken`] that is checked
//! around every await point.

use std::time::Duration;

use pikwy_core::job::{GeneratedImage, GenerationRequest};
use pikwy_core::protocol::JobStatusResponse;
use pikwy_core::types::JobId;
use tokio_util::sync::CancellationToken;

use crate::client::BackendClient;
use crate::config::PollerConfig;
use crate::error::{BackendError, PollError};

/// Terminal success of a polled job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOutcome {
    pub images: Vec<GeneratedImage>,
    /// Balance reported alongside the completed job.
    pub credits: i64,
}

/// Drives a job from submission to a terminal status.
#[derive(Debug, Clone)]
pub struct JobPoller {
    client: BackendClient,
    poll_interval: Duration,
    max_attempts: u32,
}

impl JobPoller {
    pub fn new(client: BackendClient, poll_interval: Duration, max_attempts: u32) -> Self {
        Self {
            client,
            poll_interval,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn from_config(client: BackendClient, config: &PollerConfig) -> Self {
        Self::new(client, config.poll_interval, config.max_attempts)
    }

    /// Submit a generation request and return the new job id.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<JobId, PollError> {
        let job_id = self
            .client
            .queue_generation(request)
            .await
            .map_err(PollError::from_submit)?;

        tracing::info!(job_id = %job_id, prompt = %request.prompt, "Generation job queued");
        Ok(job_id)
    }

    /// Poll until the job reaches a terminal status.
    ///
    /// A cancelled job and an unknown id both yield [`PollError::JobNotFound`].
    /// Firing `cancel` stops the loop with [`PollError::Cancelled`] regardless
    /// of the last observed status.
    pub async fn await_completion(
        &self,
        job_id: &JobId,
        cancel: &CancellationToken,
    ) -> Result<JobOutcome, PollError> {
        for attempt in 1..=self.max_attempts {
            let status = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(PollError::Cancelled),
                status = self.client.job_status(job_id) => status,
            };

            match status {
                Ok(JobStatusResponse::Completed { images, credits }) => {
                    tracing::info!(job_id = %job_id, attempt, credits, "Job completed");
                    return Ok(JobOutcome { images, credits });
                }
                Ok(JobStatusResponse::Processing) => {
                    tracing::debug!(job_id = %job_id, attempt, "Job still processing");
                }
                Ok(JobStatusResponse::Cancelled) => return Err(PollError::JobNotFound),
                Ok(JobStatusResponse::Failed { error }) => {
                    tracing::warn!(job_id = %job_id, error = %error, "Job failed");
                    return Err(PollError::GenerationFailed(error));
                }
                Err(e) if e.status() == Some(404) => return Err(PollError::JobNotFound),
                Err(e) => {
                    tracing::error!(job_id = %job_id, error = %e, "Status poll failed");
                    return Err(PollError::Polling(e));
                }
            }

            if attempt < self.max_attempts {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(PollError::Cancelled),
                    _ = tokio::time::sleep(self.poll_interval) => {}
                }
            }
        }

        tracing::warn!(job_id = %job_id, attempts = self.max_attempts, "Polling gave up");
        Err(PollError::Timeout {
            attempts: self.max_attempts,
        })
    }

    /// Stop local polling, then ask the backend to cancel the job.
    pub async fn cancel(&self, job_id: &JobId, token: &CancellationToken) -> Result<(), PollError> {
        token.cancel();
        self.client
            .cancel_job(job_id)
            .await
            .map_err(|e: BackendError| {
                tracing::warn!(job_id = %job_id, error = %e, "Cancel request failed");
                PollError::CancelFailed(e)
            })?;

        tracing::info!(job_id = %job_id, "Job cancelled");
        Ok(())
    }

    /// Submit and poll to completion.
    pub async fn generate_and_wait(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<(JobId, JobOutcome), PollError> {
        let job_id = self.generate(request).await?;
        let outcome = self.await_completion(&job_id, cancel).await?;
        Ok((job_id, outcome))
    }

    pub async fn credits(&self) -> Result<i64, PollError> {
        Ok(self.client.credits().await?)
    }

    pub async fn purchase_credits(&self) -> Result<i64, PollError> {
        Ok(self.client.purchase_credits().await?)
    }

    pub async fn authentication_status(&self) -> Result<bool, PollError> {
        Ok(self.client.authentication_status().await?)
    }
}

//! In-memory job store.
//!
//! Owns every job record and the process-wide credit ledger behind a single
//! mutex. Each job carries one explicit [`JobState`]; every transition out of
//! `Queued` happens inside one critical section, so completion and
//! cancellation can never both win for the same id, and the credit charge is
//! applied in the same step as the completion it pays for.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use pikwy_core::credits::CreditLedger;
use pikwy_core::error::CoreError;
use pikwy_core::job::{GenerationRequest, JobResult, JobState};
use pikwy_core::protocol::JobStatusResponse;
use pikwy_core::types::{JobId, Timestamp};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::generator::ContentGenerator;
use crate::runner::JobRunner;

/// Tunables for the store and its runner.
#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub initial_credits: i64,
    pub credits_in_bundle: i64,
    /// Simulated latency between submission and generation.
    pub processing_delay: Duration,
    /// Upper bound on one generator call.
    pub adapter_timeout: Duration,
    /// Jobs processed concurrently by the runner.
    pub worker_concurrency: usize,
}

/// One job record.
#[derive(Debug)]
struct JobEntry {
    request: GenerationRequest,
    state: JobState,
    /// Fired by cancel (and by shutdown) to abort pending work.
    cancel: CancellationToken,
    /// Earliest instant at which generation may start.
    ready_at: Instant,
    created_at: Timestamp,
}

impl JobEntry {
    /// Milliseconds since submission, for transition logs.
    fn age_ms(&self) -> i64 {
        (Utc::now() - self.created_at).num_milliseconds()
    }
}

#[derive(Debug)]
struct StoreInner {
    jobs: HashMap<JobId, JobEntry>,
    ledger: CreditLedger,
}

/// Work handed to the runner for one queued job.
#[derive(Debug, Clone)]
pub struct ClaimedJob {
    pub id: JobId,
    pub request: GenerationRequest,
    pub cancel: CancellationToken,
    pub ready_at: Instant,
}

/// Outcome of an attempted transition out of `Queued`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// The job moved to its terminal state.
    Applied,
    /// The job had already left `Queued` (or vanished); nothing changed.
    Skipped,
}

/// The single authoritative job store.
#[derive(Debug)]
pub struct JobStore {
    inner: Mutex<StoreInner>,
    queue: mpsc::UnboundedSender<JobId>,
    shutdown: CancellationToken,
    settings: StoreSettings,
}

impl JobStore {
    /// Create a store and the runner that executes its jobs.
    ///
    /// The runner must be driven with [`JobRunner::run`]; cancelling
    /// `shutdown` stops it and aborts all in-flight job work.
    pub fn start(
        settings: StoreSettings,
        generator: Arc<dyn ContentGenerator>,
        shutdown: CancellationToken,
    ) -> (Arc<Self>, JobRunner) {
        let (queue, receiver) = mpsc::unbounded_channel();
        let store = Arc::new(Self {
            inner: Mutex::new(StoreInner {
                jobs: HashMap::new(),
                ledger: CreditLedger::new(settings.initial_credits, settings.credits_in_bundle),
            }),
            queue,
            shutdown: shutdown.clone(),
            settings,
        });
        let runner = JobRunner::new(Arc::clone(&store), generator, receiver, shutdown);
        (store, runner)
    }

    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    /// False once shutdown has begun; submissions after that point fail.
    pub fn is_accepting(&self) -> bool {
        !self.shutdown.is_cancelled()
    }

    /// Stop the runner and abort every job's pending work.
    ///
    /// Jobs keep their current state; queued ones stay `Queued`.
    pub fn shutdown(&self) {
        if !self.shutdown.is_cancelled() {
            tracing::info!(queued = self.queued_count(), "Job store shutting down");
        }
        self.shutdown.cancel();
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // -----------------------------------------------------------------------
    // Credits
    // -----------------------------------------------------------------------

    pub fn credits(&self) -> i64 {
        self.lock().ledger.balance()
    }

    /// Add one bundle and return the new balance.
    pub fn purchase_credits(&self) -> i64 {
        let balance = self.lock().ledger.purchase_bundle();
        tracing::info!(credits = balance, "Credits purchased");
        balance
    }

    /// Fail with `InsufficientCredits` when the balance does not allow a submission.
    pub fn ensure_credits(&self) -> Result<(), CoreError> {
        self.lock().ledger.ensure_available()
    }

    // -----------------------------------------------------------------------
    // Submit
    // -----------------------------------------------------------------------

    /// Register a job and hand it to the runner. Never waits on generation.
    pub fn submit(&self, request: GenerationRequest) -> Result<JobId, CoreError> {
        request.validate()?;
        if !self.is_accepting() {
            return Err(CoreError::Internal("job runner is shutting down".into()));
        }

        let mut inner = self.lock();
        inner.ledger.ensure_available()?;

        let mut id = JobId::generate();
        while inner.jobs.contains_key(&id) {
            id = JobId::generate();
        }

        inner.jobs.insert(
            id.clone(),
            JobEntry {
                request,
                state: JobState::Queued,
                cancel: self.shutdown.child_token(),
                ready_at: Instant::now() + self.settings.processing_delay,
                created_at: Utc::now(),
            },
        );

        if self.queue.send(id.clone()).is_err() {
            inner.jobs.remove(&id);
            return Err(CoreError::Internal("job runner is not running".into()));
        }

        tracing::info!(job_id = %id, credits = inner.ledger.balance(), "Job queued");
        Ok(id)
    }

    // -----------------------------------------------------------------------
    // Status
    // -----------------------------------------------------------------------

    /// Current status of a job, with the balance attached to completions.
    pub fn status(&self, job_id: &str) -> Result<JobStatusResponse, CoreError> {
        let id = require_id(job_id)?;
        let inner = self.lock();
        let entry = inner
            .jobs
            .get(&id)
            .ok_or_else(|| CoreError::job_not_found(job_id))?;
        Ok(JobStatusResponse::from_state(
            &entry.state,
            inner.ledger.balance(),
        ))
    }

    /// Number of jobs still waiting for a terminal state.
    pub fn queued_count(&self) -> usize {
        self.lock()
            .jobs
            .values()
            .filter(|entry| entry.state.is_queued())
            .count()
    }

    // -----------------------------------------------------------------------
    // Cancel
    // -----------------------------------------------------------------------

    /// Cancel a queued job.
    ///
    /// Anything other than a queued job (completed, failed, already
    /// cancelled or unknown) is `NotFound`.
    pub fn cancel(&self, job_id: &str) -> Result<(), CoreError> {
        let id = require_id(job_id)?;
        let mut inner = self.lock();
        let entry = inner
            .jobs
            .get_mut(&id)
            .filter(|entry| entry.state.is_queued())
            .ok_or_else(|| CoreError::job_not_found(job_id))?;

        entry.state = JobState::Cancelled;
        entry.cancel.cancel();

        tracing::info!(
            job_id = %id,
            state = entry.state.name(),
            age_ms = entry.age_ms(),
            "Job cancelled",
        );
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Runner-side transitions
    // -----------------------------------------------------------------------

    /// Hand out the work for a job if it is still queued.
    pub fn claim(&self, id: &JobId) -> Option<ClaimedJob> {
        let inner = self.lock();
        let entry = inner.jobs.get(id).filter(|entry| entry.state.is_queued())?;
        Some(ClaimedJob {
            id: id.clone(),
            request: entry.request.clone(),
            cancel: entry.cancel.clone(),
            ready_at: entry.ready_at,
        })
    }

    pub fn is_queued(&self, id: &JobId) -> bool {
        self.lock()
            .jobs
            .get(id)
            .is_some_and(|entry| entry.state.is_queued())
    }

    /// Move a queued job to `Completed` and charge one credit, atomically.
    pub fn complete(&self, id: &JobId, result: JobResult) -> Transition {
        let mut guard = self.lock();
        let inner = &mut *guard;
        let Some(entry) = inner.jobs.get_mut(id).filter(|e| e.state.is_queued()) else {
            tracing::debug!(job_id = %id, "Discarding result for job that is no longer queued");
            return Transition::Skipped;
        };

        let image_count = result.images.len();
        entry.state = JobState::Completed(result);
        let balance = inner.ledger.charge_completion();

        tracing::info!(
            job_id = %id,
            state = entry.state.name(),
            age_ms = entry.age_ms(),
            image_count,
            credits = balance,
            "Job completed",
        );
        Transition::Applied
    }

    /// Move a queued job to `Failed`. Credits are untouched.
    pub fn fail(&self, id: &JobId, reason: impl Into<String>) -> Transition {
        let mut inner = self.lock();
        let Some(entry) = inner.jobs.get_mut(id).filter(|e| e.state.is_queued()) else {
            return Transition::Skipped;
        };

        let reason = reason.into();
        tracing::warn!(
            job_id = %id,
            age_ms = entry.age_ms(),
            error = %reason,
            "Job failed",
        );
        entry.state = JobState::Failed(reason);
        Transition::Applied
    }
}

fn require_id(job_id: &str) -> Result<JobId, CoreError> {
    if job_id.is_empty() {
        return Err(CoreError::InvalidRequest("Missing jobId parameter.".into()));
    }
    Ok(JobId::from(job_id))
}

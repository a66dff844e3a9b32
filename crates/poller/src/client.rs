//! REST client for the Pikwy backend.
//!
//! Thin wrappers over the protocol endpoints using [`reqwest`]. Every call
//! attaches a bearer token from the configured [`TokenProvider`] and decodes
//! the shared payload types from `pikwy_core::protocol`.

use std::sync::Arc;

use pikwy_core::job::GenerationRequest;
use pikwy_core::protocol::{
    params, routes, AuthStatusResponse, CancelResponse, CreditsResponse, JobStatusResponse,
    QueueGenerationResponse,
};
use pikwy_core::types::JobId;
use reqwest::Method;
use serde::de::DeserializeOwned;

use crate::auth::TokenProvider;
use crate::error::BackendError;

/// HTTP client for a single backend host.
#[derive(Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    api_url: String,
    tokens: Arc<dyn TokenProvider>,
}

impl BackendClient {
    /// Create a client for `backend_host`, e.g. `http://localhost:3000`.
    pub fn new(backend_host: &str, tokens: Arc<dyn TokenProvider>) -> Self {
        Self::with_client(reqwest::Client::new(), backend_host, tokens)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(
        client: reqwest::Client,
        backend_host: &str,
        tokens: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            client,
            api_url: format!("{}{}", backend_host.trim_end_matches('/'), routes::API_PREFIX),
            tokens,
        }
    }

    /// `GET /queue-generation`. Returns the id of the queued job.
    pub async fn queue_generation(
        &self,
        request: &GenerationRequest,
    ) -> Result<JobId, BackendError> {
        let query = [
            (params::PROMPT, request.prompt.clone()),
            (params::WIDTH, request.width.to_string()),
            (params::HEIGHT, request.height.to_string()),
            (params::COUNT, request.count.to_string()),
        ];
        let response: QueueGenerationResponse = self
            .call(Method::GET, routes::QUEUE_GENERATION, &query)
            .await?;
        Ok(response.job_id)
    }

    /// `GET /job-status?jobId=...`.
    pub async fn job_status(&self, job_id: &JobId) -> Result<JobStatusResponse, BackendError> {
        self.call(
            Method::GET,
            routes::JOB_STATUS,
            &[(params::JOB_ID, job_id.to_string())],
        )
        .await
    }

    /// `POST /job-status/cancel?jobId=...`.
    pub async fn cancel_job(&self, job_id: &JobId) -> Result<CancelResponse, BackendError> {
        self.call(
            Method::POST,
            routes::CANCEL_JOB,
            &[(params::JOB_ID, job_id.to_string())],
        )
        .await
    }

    /// `GET /credits`.
    pub async fn credits(&self) -> Result<i64, BackendError> {
        let response: CreditsResponse = self.call(Method::GET, routes::CREDITS, &[]).await?;
        Ok(response.credits)
    }

    /// `POST /purchase-credits`. Returns the new balance.
    pub async fn purchase_credits(&self) -> Result<i64, BackendError> {
        let response: CreditsResponse = self
            .call(Method::POST, routes::PURCHASE_CREDITS, &[])
            .await?;
        Ok(response.credits)
    }

    /// `POST /authentication/status`.
    pub async fn authentication_status(&self) -> Result<bool, BackendError> {
        let response: AuthStatusResponse =
            self.call(Method::POST, routes::AUTH_STATUS, &[]).await?;
        Ok(response.is_authenticated)
    }

    // ---- private helpers ----

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, BackendError> {
        let token = self.tokens.token().await?;
        let response = self
            .client
            .request(method, format!("{}{}", self.api_url, path))
            .bearer_auth(token)
            .query(query)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Ensure the response has a success status code, otherwise turn the
    /// body into a [`BackendError::Status`].
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, BackendError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(BackendError::from_body(status.as_u16(), &body));
        }
        Ok(response)
    }

    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, BackendError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json().await?)
    }
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

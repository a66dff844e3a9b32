use std::sync::Arc;

use crate::config::ServerConfig;
use crate::store::JobStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// The single job store owning jobs and the credit balance.
    pub store: Arc<JobStore>,
    /// Server configuration (read by the auth extractor).
    pub config: Arc<ServerConfig>,
}

use std::time::Duration;

/// Poller configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Backend base URL without the `/api` prefix (default: `http://localhost:3000`).
    pub backend_host: String,
    /// Wait between status polls (default: `1000` ms).
    pub poll_interval: Duration,
    /// Status polls before giving up (default: `60`).
    pub max_attempts: u32,
    /// Bearer token attached to every request.
    pub auth_token: Option<String>,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            backend_host: "http://localhost:3000".into(),
            poll_interval: Duration::from_secs(1),
            max_attempts: 60,
            auth_token: None,
        }
    }
}

impl PollerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var               | Default                  |
    /// |-----------------------|--------------------------|
    /// | `BACKEND_HOST`        | `http://localhost:3000`  |
    /// | `POLLING_INTERVAL_MS` | `1000`                   |
    /// | `MAX_POLL_ATTEMPTS`   | `60`                     |
    /// | `AUTH_TOKEN`          | (none)                   |
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let backend_host = std::env::var("BACKEND_HOST").unwrap_or(defaults.backend_host);

        let poll_interval = std::env::var("POLLING_INTERVAL_MS")
            .ok()
            .map(|v| {
                v.parse()
                    .map(Duration::from_millis)
                    .expect("POLLING_INTERVAL_MS must be a valid u64")
            })
            .unwrap_or(defaults.poll_interval);

        let max_attempts = std::env::var("MAX_POLL_ATTEMPTS")
            .ok()
            .map(|v| v.parse().expect("MAX_POLL_ATTEMPTS must be a valid u32"))
            .unwrap_or(defaults.max_attempts);

        let auth_token = std::env::var("AUTH_TOKEN").ok().filter(|t| !t.is_empty());

        Self {
            backend_host,
            poll_interval,
            max_attempts,
            auth_token,
        }
    }
}

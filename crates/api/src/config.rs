use std::time::Duration;

use pikwy_core::credits::{DEFAULT_CREDITS_IN_BUNDLE, DEFAULT_INITIAL_CREDITS};

use crate::store::StoreSettings;

/// Which content generator backs the job runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratorKind {
    /// Fixed catalog of placeholder images.
    Placeholder,
    /// Screenshot-service locators built from the prompt URL.
    Screenshot { base_url: String },
}

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Seconds to wait for the job runner to stop after the server drains.
    pub shutdown_timeout_secs: u64,
    /// Reject `/api` requests that carry no bearer token (default: `true`).
    pub require_auth: bool,
    /// Credit balance at startup (default: `10`).
    pub initial_credits: i64,
    /// Credits added per purchase (default: `10`).
    pub credits_in_bundle: i64,
    /// Simulated processing latency per job (default: `5000` ms).
    pub processing_delay_ms: u64,
    /// Upper bound on a single generator call (default: `30` s).
    pub adapter_timeout_secs: u64,
    /// Jobs processed concurrently by the runner (default: `8`).
    pub worker_concurrency: usize,
    pub generator: GeneratorKind,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
            cors_origins: vec!["http://localhost:8080".into()],
            request_timeout_secs: 30,
            shutdown_timeout_secs: 10,
            require_auth: true,
            initial_credits: DEFAULT_INITIAL_CREDITS,
            credits_in_bundle: DEFAULT_CREDITS_IN_BUNDLE,
            processing_delay_ms: 5000,
            adapter_timeout_secs: 30,
            worker_concurrency: 8,
            generator: GeneratorKind::Placeholder,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                  |
    /// |-------------------------|--------------------------|
    /// | `HOST`                  | `0.0.0.0`                |
    /// | `PORT`                  | `3000`                   |
    /// | `CORS_ORIGINS`          | `http://localhost:8080`  |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                     |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `10`                     |
    /// | `REQUIRE_AUTH`          | `true`                   |
    /// | `INITIAL_CREDITS`       | `10`                     |
    /// | `CREDITS_IN_BUNDLE`     | `10`                     |
    /// | `PROCESSING_DELAY_MS`   | `5000`                   |
    /// | `ADAPTER_TIMEOUT_SECS`  | `30`                     |
    /// | `WORKER_CONCURRENCY`    | `8`                      |
    /// | `GENERATOR`             | `placeholder`            |
    /// | `SCREENSHOT_BASE_URL`   | (required for screenshot)|
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let host = std::env::var("HOST").unwrap_or(defaults.host);

        let cors_origins: Vec<String> = match std::env::var("CORS_ORIGINS") {
            Ok(raw) => raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            Err(_) => defaults.cors_origins,
        };

        let generator = match std::env::var("GENERATOR")
            .unwrap_or_else(|_| "placeholder".into())
            .to_ascii_lowercase()
            .as_str()
        {
            "placeholder" => GeneratorKind::Placeholder,
            "screenshot" => GeneratorKind::Screenshot {
                base_url: std::env::var("SCREENSHOT_BASE_URL")
                    .expect("SCREENSHOT_BASE_URL must be set when GENERATOR=screenshot"),
            },
            other => panic!("Unknown GENERATOR '{other}', expected 'placeholder' or 'screenshot'"),
        };

        Self {
            host,
            port: env_or("PORT", defaults.port),
            cors_origins,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs),
            shutdown_timeout_secs: env_or("SHUTDOWN_TIMEOUT_SECS", defaults.shutdown_timeout_secs),
            require_auth: env_or("REQUIRE_AUTH", defaults.require_auth),
            initial_credits: env_or("INITIAL_CREDITS", defaults.initial_credits),
            credits_in_bundle: env_or("CREDITS_IN_BUNDLE", defaults.credits_in_bundle),
            processing_delay_ms: env_or("PROCESSING_DELAY_MS", defaults.processing_delay_ms),
            adapter_timeout_secs: env_or("ADAPTER_TIMEOUT_SECS", defaults.adapter_timeout_secs),
            worker_concurrency: env_or("WORKER_CONCURRENCY", defaults.worker_concurrency),
            generator,
        }
    }

    /// Job store settings derived from this configuration.
    pub fn store_settings(&self) -> StoreSettings {
        StoreSettings {
            initial_credits: self.initial_credits,
            credits_in_bundle: self.credits_in_bundle,
            processing_delay: Duration::from_millis(self.processing_delay_ms),
            adapter_timeout: Duration::from_secs(self.adapter_timeout_secs),
            worker_concurrency: self.worker_concurrency.max(1),
        }
    }
}

/// Read and parse an env var, falling back to `default` when unset.
///
/// Panics on a present but unparseable value so misconfiguration fails fast.
fn env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{key} has invalid value '{raw}': {e}")),
        Err(_) => default,
    }
}

//! Bearer-token providers.
//!
//! The host platform hands out tokens; this crate only attaches them.

use async_trait::async_trait;

use crate::error::BackendError;

/// Source of the bearer token attached to every backend request.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn token(&self) -> Result<String, BackendError>;
}

/// A fixed token, e.g. from `AUTH_TOKEN`.
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn token(&self) -> Result<String, BackendError> {
        if self.0.trim().is_empty() {
            return Err(BackendError::Token("no bearer token configured".into()));
        }
        Ok(self.0.clone())
    }
}

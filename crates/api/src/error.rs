use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pikwy_core::error::CoreError;
use pikwy_core::protocol::ErrorBody;

const INTERNAL_MESSAGE: &str = "An internal error occurred";

/// Error type returned by every handler.
///
/// Renders as `{ "error": message, "code": CODE }`. Internal details are
/// logged, never sent to the client.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The query string could not be deserialized at all (for example a
    /// repeated `jobId`).
    #[error(transparent)]
    Query(#[from] QueryRejection),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Status code, machine-readable code and client-facing message.
    fn classify(&self) -> (StatusCode, &'static str, String) {
        let core = match self {
            AppError::Query(rejection) => {
                return (StatusCode::BAD_REQUEST, "BAD_REQUEST", rejection.body_text());
            }
            AppError::Core(core) => core,
        };

        match core {
            CoreError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST", msg.clone()),
            CoreError::InsufficientCredits { balance } => {
                tracing::debug!(credits = balance, "Submission refused");
                (
                    StatusCode::FORBIDDEN,
                    "INSUFFICIENT_CREDITS",
                    "Not enough credits required to generate content.".into(),
                )
            }
            // The id is left out so probing unknown ids reveals nothing.
            CoreError::NotFound { entity, .. } => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", format!("{entity} not found."))
            }
            CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
            CoreError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    INTERNAL_MESSAGE.into(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, error) = self.classify();
        let body = ErrorBody {
            error,
            code: code.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

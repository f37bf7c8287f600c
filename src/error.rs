//! Error types shared across the crate.
//!
//! Store and service code returns [`Result`]; the HTTP boundary maps every
//! failure into [`ApiError`], which is the only error shape a client ever
//! sees. Internal detail stays in the logs.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Crate-level error. Most paths flow through `anyhow` with context attached
/// at the call site; auth failures keep their own variant so the API layer
/// can map them without string matching.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Authentication and credential failures.
///
/// Deliberately coarse: missing, malformed, expired, and tampered tokens all
/// collapse into `InvalidToken` so the API response never reveals which check
/// failed (or whether an account exists).
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid or expired token")]
    InvalidToken,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("failed to hash password")]
    Hash,
}

/// Client-facing error taxonomy. One variant per failure a client can
/// observe; `IntoResponse` turns each into a status code plus a generic
/// JSON body.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("user already exists")]
    Conflict,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("unauthorized")]
    Unauthorized,

    #[error("forbidden")]
    Forbidden,

    #[error("not found")]
    NotFound,

    #[error("inference service unavailable")]
    Upstream,

    #[error("internal error")]
    Internal,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation(_)
            | ApiError::Conflict
            | ApiError::InvalidCredentials => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Upstream => StatusCode::BAD_GATEWAY,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = ErrorBody {
            error: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        match error {
            Error::Auth(AuthError::InvalidCredentials) => ApiError::InvalidCredentials,
            Error::Auth(_) => ApiError::Unauthorized,
            Error::Other(error) => {
                tracing::error!(%error, "request failed");
                ApiError::Internal
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_detail_never_reaches_the_body() {
        let error: Error = anyhow::anyhow!("connection refused (db at /secret/path)").into();
        let api_error = ApiError::from(error);

        assert_eq!(api_error.to_string(), "internal error");
    }

    #[test]
    fn auth_failures_map_to_unauthorized() {
        let api_error = ApiError::from(Error::Auth(AuthError::InvalidToken));
        assert!(matches!(api_error, ApiError::Unauthorized));
    }
}

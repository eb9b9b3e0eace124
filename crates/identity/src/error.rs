//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures internal errors to Sentry
//! before responding to the client. All route handlers return `Result<T, AppError>`.
//!
//! Every error response is a JSON body with a stable machine-readable `code`
//! and a human-readable `message`. Internal detail never crosses the boundary.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::services::auth::AuthError;

const CODE_USER_EXISTS: &str = "ERR_USER_EXISTS";
const CODE_INVALID_CREDENTIALS: &str = "ERR_INVALID_CREDENTIALS";
const CODE_VALIDATION: &str = "ERR_VALIDATION";
const CODE_INTERNAL: &str = "ERR_INTERNAL";

/// Application-level error type for the identity service.
#[derive(Debug, Error)]
pub enum AppError {
    /// Account or session operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON body returned for every error response.
#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server faults to Sentry; client mistakes stay out of it
        if matches!(
            self,
            Self::Internal(_)
                | Self::Auth(
                    AuthError::Repository(_) | AuthError::Token(_) | AuthError::PasswordHash(_)
                )
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let (status, code, message) = match &self {
            Self::Auth(err) => match err {
                AuthError::UserAlreadyExists => (
                    StatusCode::CONFLICT,
                    CODE_USER_EXISTS,
                    "An account with this phone number already exists".to_string(),
                ),
                AuthError::InvalidCredentials => (
                    StatusCode::UNAUTHORIZED,
                    CODE_INVALID_CREDENTIALS,
                    "Invalid credentials".to_string(),
                ),
                AuthError::InvalidPhone(e) => {
                    (StatusCode::BAD_REQUEST, CODE_VALIDATION, e.to_string())
                }
                AuthError::WeakPassword(msg) | AuthError::InvalidName(msg) => {
                    (StatusCode::BAD_REQUEST, CODE_VALIDATION, msg.clone())
                }
                // Don't expose storage or crypto error details to clients
                AuthError::Repository(_) | AuthError::Token(_) | AuthError::PasswordHash(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    CODE_INTERNAL,
                    "Internal server error".to_string(),
                ),
            },
            Self::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                CODE_INTERNAL,
                "Internal server error".to_string(),
            ),
        };

        (status, Json(ErrorBody { code, message })).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this once the acting user is resolved to associate server errors
/// with the account.
pub fn set_sentry_user(user_id: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            ..Default::default()
        }));
    });
}

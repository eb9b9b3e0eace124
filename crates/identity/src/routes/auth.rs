//! Authentication route handlers.
//!
//! JSON endpoints for account creation and the token lifecycle. The
//! request types implement `Debug` manually so credentials never reach
//! a log line.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::{Result, set_sentry_user};
use crate::middleware::ActingUser;
use crate::models::{IssuedTokens, UserSnapshot};
use crate::state::AppState;

// =============================================================================
// Request Types
// =============================================================================

/// Registration request body.
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub phone: String,
    pub password: String,
    /// Optional; empty when the caller did not provide one.
    #[serde(default)]
    pub name: String,
    /// Optional; empty when the caller did not provide one.
    #[serde(default)]
    pub surname: String,
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("phone", &self.phone)
            .field("password", &"[REDACTED]")
            .field("name", &self.name)
            .field("surname", &self.surname)
            .finish()
    }
}

/// Login request body.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub phone: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("phone", &self.phone)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Refresh request body.
#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

impl std::fmt::Debug for RefreshRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshRequest")
            .field("refresh_token", &"[REDACTED]")
            .finish()
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// Token pair returned by login and refresh.
#[derive(Serialize)]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
}

impl From<IssuedTokens> for TokenPairResponse {
    fn from(tokens: IssuedTokens) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Create an account.
///
/// POST /auth/register
///
/// # Errors
///
/// Returns `ERR_VALIDATION` for a malformed phone, weak password or
/// non-letter name, and `ERR_USER_EXISTS` when the phone is taken.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserSnapshot>)> {
    let user = state
        .auth()
        .register(&req.phone, &req.password, &req.name, &req.surname)
        .await?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok((StatusCode::CREATED, Json(UserSnapshot::from(&user))))
}

/// Exchange phone and password for a token pair.
///
/// POST /auth/login
///
/// # Errors
///
/// Returns `ERR_INVALID_CREDENTIALS` for an unknown phone and a wrong
/// password alike.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenPairResponse>> {
    let tokens = state.auth().login(&req.phone, &req.password).await?;

    Ok(Json(tokens.into()))
}

/// Rotate the acting user's refresh token.
///
/// POST /auth/refresh
///
/// The previous refresh token stops working once this returns.
///
/// # Errors
///
/// Returns `ERR_INVALID_CREDENTIALS` when the presented token does not
/// match the stored one, is expired, or the acting user is unknown.
pub async fn refresh(
    State(state): State<AppState>,
    ActingUser(user_id): ActingUser,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<TokenPairResponse>> {
    set_sentry_user(&user_id);

    let tokens = state.auth().refresh(user_id, &req.refresh_token).await?;

    tracing::info!(user_id = %user_id, "Refresh token rotated");

    Ok(Json(tokens.into()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_names_default_to_empty() {
        let req: RegisterRequest =
            serde_json::from_str(r#"{"phone": "+998901234567", "password": "password123"}"#)
                .unwrap();

        assert_eq!(req.phone, "+998901234567");
        assert!(req.name.is_empty());
        assert!(req.surname.is_empty());
    }

    #[test]
    fn test_request_debug_redacts_credentials() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"phone": "+998901234567", "password": "password123"}"#)
                .unwrap();
        let debug_output = format!("{req:?}");
        assert!(!debug_output.contains("password123"));
        assert!(debug_output.contains("[REDACTED]"));

        let req = RefreshRequest {
            refresh_token: "opaque-secret".to_string(),
        };
        let debug_output = format!("{req:?}");
        assert!(!debug_output.contains("opaque-secret"));
    }
}

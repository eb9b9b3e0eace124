//! Acting-user extraction.
//!
//! Provides the extractor that resolves which account a request acts
//! for. The upstream gateway has already authenticated the caller and
//! forwards the subject as a trusted header; this service never parses
//! access tokens off the wire itself.

use axum::{extract::FromRequestParts, http::request::Parts};

use bazaar_core::UserId;

use crate::error::AppError;
use crate::services::auth::AuthError;

/// Gateway-injected header carrying the acting user id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Extractor for the acting user resolved by the upstream gateway.
///
/// An absent or malformed header is rejected with the same coarse
/// invalid-credentials response as a wrong password, so callers cannot
/// probe which accounts exist.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(ActingUser(user_id): ActingUser) -> impl IntoResponse {
///     format!("acting as {user_id}")
/// }
/// ```
pub struct ActingUser(pub UserId);

impl<S> FromRequestParts<S> for ActingUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(AuthError::InvalidCredentials)?;

        let user_id = UserId::parse(value).map_err(|_| AuthError::InvalidCredentials)?;

        Ok(Self(user_id))
    }
}

//! User account route handlers.
//!
//! All routes here act on the user resolved from the gateway-injected
//! `X-User-Id` header.

use axum::{Json, extract::State};

use crate::error::{Result, set_sentry_user};
use crate::middleware::ActingUser;
use crate::models::UserSnapshot;
use crate::state::AppState;

/// Summary of the acting user.
///
/// GET /users/me
///
/// # Errors
///
/// Returns `ERR_INVALID_CREDENTIALS` when the acting user id does not
/// resolve to an account.
pub async fn me(
    State(state): State<AppState>,
    ActingUser(user_id): ActingUser,
) -> Result<Json<UserSnapshot>> {
    set_sentry_user(&user_id);

    let user = state.auth().get_user(user_id).await?;

    Ok(Json(UserSnapshot::from(&user)))
}

/// Grant the seller role to the acting user.
///
/// POST /users/promote-to-seller
///
/// Idempotent: promoting an account that already sells succeeds
/// without duplicating the role row.
///
/// # Errors
///
/// Returns `ERR_INVALID_CREDENTIALS` when the acting user id does not
/// resolve to an account.
pub async fn promote_to_seller(
    State(state): State<AppState>,
    ActingUser(user_id): ActingUser,
) -> Result<Json<UserSnapshot>> {
    set_sentry_user(&user_id);

    let user = state.auth().promote_to_seller(user_id).await?;

    tracing::info!(user_id = %user.id, "Seller role granted");

    Ok(Json(UserSnapshot::from(&user)))
}

//! Signing key discovery.

use axum::{Json, extract::State};

use crate::services::jwt::JwkSet;
use crate::state::AppState;

/// The JSON Web Key Set for access token verification.
///
/// GET /.well-known/jwks.json
///
/// Downstream services fetch this to verify token signatures locally.
/// The set is computed once at startup; rotating the signing key means
/// restarting with a new PEM and kid.
pub async fn jwks(State(state): State<AppState>) -> Json<JwkSet> {
    Json(state.jwks().clone())
}

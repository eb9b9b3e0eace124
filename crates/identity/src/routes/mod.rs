//! HTTP route handlers for the identity service.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                  - Liveness check
//! GET  /health/ready            - Readiness check (database round trip)
//!
//! # Auth
//! POST /auth/register           - Create an account
//! POST /auth/login              - Exchange credentials for a token pair
//! POST /auth/refresh            - Rotate a refresh token (X-User-Id)
//!
//! # Users (gateway-authenticated via X-User-Id)
//! GET  /users/me                - Acting user summary
//! POST /users/promote-to-seller - Grant the seller role
//!
//! # Key discovery
//! GET  /.well-known/jwks.json   - Signing keys for downstream verifiers
//! ```

pub mod auth;
pub mod jwks;
pub mod users;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
}

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(users::me))
        .route("/promote-to-seller", post(users::promote_to_seller))
}

/// Create all routes for the identity service.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/users", user_routes())
        .route("/.well-known/jwks.json", get(jwks::jwks))
}

//! Application state shared across handlers.

use std::sync::Arc;

use secrecy::ExposeSecret;
use sqlx::PgPool;

use crate::config::BazaarConfig;
use crate::db::PgUnitOfWork;
use crate::services::auth::AuthService;
use crate::services::jwt::{AccessTokenSigner, JwkSet, KeyError};
use crate::services::tokens::TokenService;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: BazaarConfig,
    pool: PgPool,
    auth: AuthService<PgUnitOfWork>,
    jwks: JwkSet,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Parses the signing key from configuration and wires the auth
    /// service to the Postgres-backed unit of work.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError`] if the configured private key PEM cannot be
    /// parsed as an RSA key.
    pub fn new(config: BazaarConfig, pool: PgPool) -> Result<Self, KeyError> {
        let signer = AccessTokenSigner::from_pem(
            config.jwt.private_key_pem.expose_secret(),
            &config.jwt.kid,
            &config.jwt.issuer,
            config.jwt.access_ttl(),
        )?;
        // The key set never changes after startup; keep a copy to serve
        let jwks = signer.jwks().clone();

        let tokens = TokenService::new(signer, config.jwt.refresh_ttl());
        let auth = AuthService::new(PgUnitOfWork::new(pool.clone()), tokens);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                auth,
                jwks,
            }),
        })
    }

    /// Get a reference to the service configuration.
    #[must_use]
    pub fn config(&self) -> &BazaarConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the auth service.
    #[must_use]
    pub fn auth(&self) -> &AuthService<PgUnitOfWork> {
        &self.inner.auth
    }

    /// Get a reference to the JWKS document for the signing key.
    #[must_use]
    pub fn jwks(&self) -> &JwkSet {
        &self.inner.jwks
    }
}

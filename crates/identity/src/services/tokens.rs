//! Refresh token generation and the token issuance service.
//!
//! [`TokenService`] is the only place that creates or invalidates
//! refresh token rows. It never writes events and never commits; the
//! calling orchestration owns the transaction.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{Duration, Utc};
use rand::RngCore;
use thiserror::Error;

use bazaar_core::UserId;

use super::jwt::AccessTokenSigner;
use super::password::{HashError, PasswordHasher};
use crate::db::{RefreshTokenStore, RepositoryError};
use crate::models::{IssuedTokens, User};

/// Random bytes drawn per refresh token: 256 bits of entropy, which
/// encodes to 43 URL-safe characters.
pub const REFRESH_TOKEN_BYTES: usize = 32;

/// Errors during token issuance.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Access token signing failed.
    #[error("failed to sign access token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    /// Hashing the refresh token for storage failed.
    #[error(transparent)]
    Hashing(#[from] HashError),

    /// The store rejected a read or write.
    #[error(transparent)]
    Store(#[from] RepositoryError),
}

/// Opaque token generator backed by the OS entropy source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecureTokenGenerator;

impl SecureTokenGenerator {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Generate a URL-safe token from `byte_length` random bytes.
    #[must_use]
    pub fn generate(&self, byte_length: usize) -> String {
        let mut bytes = vec![0u8; byte_length];
        rand::rng().fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(&bytes)
    }
}

/// Issues access/refresh pairs and verifies presented refresh tokens.
pub struct TokenService {
    signer: AccessTokenSigner,
    hasher: PasswordHasher,
    generator: SecureTokenGenerator,
    refresh_ttl: Duration,
}

impl TokenService {
    /// Create a token service around a loaded signer.
    #[must_use]
    pub const fn new(signer: AccessTokenSigner, refresh_ttl: Duration) -> Self {
        Self {
            signer,
            hasher: PasswordHasher::new(),
            generator: SecureTokenGenerator::new(),
            refresh_ttl,
        }
    }

    /// Mint an access token and issue a fresh refresh token for the
    /// user, overwriting any previous refresh token row (rotation).
    ///
    /// Exactly one refresh token row is created or mutated. No event
    /// is written here; callers decide what the operation means.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Signing`] if the access token cannot be
    /// signed, [`TokenError::Store`] if persisting the rotation fails.
    pub async fn issue_for_user<S: RefreshTokenStore>(
        &self,
        store: &mut S,
        user: &User,
    ) -> Result<IssuedTokens, TokenError> {
        let access_token = self.signer.generate_access_token(user.id, &user.roles)?;

        let refresh_token = self.generator.generate(REFRESH_TOKEN_BYTES);
        let token_hash = self.hasher.hash(&refresh_token)?;
        let expires_at = Utc::now() + self.refresh_ttl;

        store.upsert(user.id, &token_hash, expires_at).await?;

        Ok(IssuedTokens {
            access_token,
            refresh_token,
        })
    }

    /// Check a presented refresh token against the stored row.
    ///
    /// Returns `Ok(false)` when there is no row, the hash does not
    /// match, or the token is expired. Store errors pass through so
    /// callers can tell a verification failure from a storage failure.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] from the underlying store.
    pub async fn verify_refresh<S: RefreshTokenStore>(
        &self,
        store: &mut S,
        user_id: UserId,
        presented: &str,
    ) -> Result<bool, RepositoryError> {
        let Some(record) = store.find_by_user(user_id).await? else {
            return Ok(false);
        };

        if record.is_expired(Utc::now()) {
            return Ok(false);
        }

        Ok(self.hasher.verify(presented, &record.token_hash))
    }
}

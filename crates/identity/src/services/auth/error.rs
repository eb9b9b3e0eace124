//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::password::HashError;
use crate::services::tokens::TokenError;

/// Errors that can occur during authentication operations.
///
/// Deliberately coarse where it matters: an unknown phone, a wrong
/// password, and a rotated-away or expired refresh token all surface
/// as [`AuthError::InvalidCredentials`], so responses cannot be used
/// to probe which accounts exist.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid phone number format.
    #[error("invalid phone number: {0}")]
    InvalidPhone(#[from] bazaar_core::PhoneError),

    /// Invalid credentials (unknown user, wrong password, or a
    /// refresh token that does not verify).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Name or surname validation failed.
    #[error("name validation failed: {0}")]
    InvalidName(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Token issuance error.
    #[error("token error: {0}")]
    Token(#[from] TokenError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash(#[from] HashError),
}

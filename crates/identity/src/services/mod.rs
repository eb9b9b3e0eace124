//! Business logic services for the identity crate.
//!
//! # Services
//!
//! - `auth` - Registration, login, refresh, and seller promotion
//! - `jwt` - RS256 access token signing and JWKS export
//! - `password` - Argon2id hashing for passwords and refresh tokens
//! - `tokens` - Refresh token generation, rotation and verification

pub mod auth;
pub mod jwt;
pub mod password;
pub mod tokens;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod testutil;

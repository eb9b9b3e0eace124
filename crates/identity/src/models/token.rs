//! Token domain types.

use chrono::{DateTime, Utc};

use bazaar_core::{RefreshTokenId, UserId};

/// A stored refresh token (domain type).
///
/// Only the argon2 hash of the token is persisted; the plaintext is
/// returned to the client once at issuance and never stored.
#[derive(Debug, Clone)]
pub struct RefreshTokenRecord {
    /// Database ID of this record.
    pub id: RefreshTokenId,
    /// User who owns this token. At most one record exists per user.
    pub user_id: UserId,
    /// Argon2 hash of the token plaintext.
    pub token_hash: String,
    /// When this token stops verifying, regardless of hash match.
    pub expires_at: DateTime<Utc>,
    /// When this record was first created.
    pub created_at: DateTime<Utc>,
    /// When this record was last rotated.
    pub updated_at: DateTime<Utc>,
}

impl RefreshTokenRecord {
    /// Whether this token has passed its expiry.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// An access/refresh token pair returned to the client.
///
/// The refresh token here is the plaintext form; its hash is what was
/// persisted.
#[derive(Debug, Clone)]
pub struct IssuedTokens {
    /// Signed RS256 JWT, short-lived.
    pub access_token: String,
    /// Opaque refresh token, long-lived, single-use (rotated on refresh).
    pub refresh_token: String,
}

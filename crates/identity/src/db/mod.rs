//! Database operations for the identity `PostgreSQL`.
//!
//! # Database: `bazaar_identity`
//!
//! ## Tables
//!
//! - `users` - Accounts keyed by phone number
//! - `user_roles` - Role grants, one row per (user, role)
//! - `refresh_tokens` - Hashed refresh tokens, one row per user
//! - `outbox_events` - Transactional outbox for domain events
//!
//! # Migrations
//!
//! Migrations are stored in `crates/identity/migrations/` and run via:
//! ```bash
//! cargo run -p bazaar-cli -- migrate
//! ```
//!
//! # Store traits
//!
//! Orchestration code never touches `sqlx` directly. It goes through
//! capability traits ([`UserDirectory`], [`RefreshTokenStore`],
//! [`EventSink`]) so the same logic runs against a pool-backed reader,
//! a transaction-scoped store, or the in-memory fake used in tests.
//! [`UnitOfWork`] hands out both views and owns the atomic boundary.

pub mod outbox;
pub mod tokens;
pub mod tx;
pub mod users;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub mod mem;

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use bazaar_core::{PhoneNumber, Role, UserId};

use crate::models::{EventKind, RefreshTokenRecord, User, UserSnapshot};

pub use tx::{PgTxStore, PgUnitOfWork};
pub use users::PgUserDirectory;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique phone).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

// ============================================================================
// Capability traits
// ============================================================================

/// Lookup and mutation of user accounts and their role grants.
pub trait UserDirectory: Send {
    /// Find a user by phone number, roles included.
    fn find_by_phone(
        &mut self,
        phone: &PhoneNumber,
    ) -> impl Future<Output = Result<Option<User>, RepositoryError>> + Send;

    /// Find a user by ID, roles included.
    fn find_by_id(
        &mut self,
        id: UserId,
    ) -> impl Future<Output = Result<Option<User>, RepositoryError>> + Send;

    /// Insert a new user together with its role rows.
    ///
    /// Returns [`RepositoryError::Conflict`] if the phone number is
    /// already taken.
    fn insert(&mut self, user: &User) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Grant a role to a user. Granting an already-held role is a no-op.
    fn add_role(
        &mut self,
        id: UserId,
        role: Role,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

/// Storage for refresh tokens. At most one row exists per user;
/// issuing a new token overwrites the previous one.
pub trait RefreshTokenStore: Send {
    /// Load the user's current refresh token, if any.
    ///
    /// Transaction-scoped implementations lock the row until commit so
    /// concurrent rotations for the same user serialize.
    fn find_by_user(
        &mut self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Option<RefreshTokenRecord>, RepositoryError>> + Send;

    /// Create or overwrite the user's refresh token row.
    fn upsert(
        &mut self,
        user_id: UserId,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

/// Append-only recording of domain events for downstream consumers.
pub trait EventSink: Send {
    /// Append one event. Visible to consumers only once the enclosing
    /// transaction commits.
    fn append(
        &mut self,
        kind: EventKind,
        payload: &UserSnapshot,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

/// A transaction-scoped store bundle. All writes made through it
/// become visible atomically on [`StoreTx::commit`]; dropping the
/// value without committing rolls everything back.
pub trait StoreTx: UserDirectory + RefreshTokenStore + EventSink + Send {
    /// Commit every write made through this store.
    fn commit(self) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

/// Hands out storage views: a plain reader for pre-transaction
/// lookups and a transaction-scoped store for atomic write sequences.
pub trait UnitOfWork: Send + Sync {
    /// Non-transactional read view.
    type Reader: UserDirectory;
    /// Transaction-scoped store.
    type Tx: StoreTx;

    /// A reader for lookups that do not need transactional isolation.
    fn reader(&self) -> Self::Reader;

    /// Begin a transaction.
    fn begin(&self) -> impl Future<Output = Result<Self::Tx, RepositoryError>> + Send;
}

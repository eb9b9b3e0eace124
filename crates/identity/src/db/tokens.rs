//! Refresh token queries.
//!
//! These only exist transaction-scoped: issuing and verifying tokens
//! always happens inside a unit of work, and the `SELECT ... FOR
//! UPDATE` below serializes concurrent rotations for one user.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use bazaar_core::{RefreshTokenId, UserId};

use super::tx::PgTxStore;
use super::{RefreshTokenStore, RepositoryError};
use crate::models::RefreshTokenRecord;

const SELECT_FOR_UPDATE: &str = r"
    SELECT id, user_id, token_hash, expires_at, created_at, updated_at
    FROM refresh_tokens
    WHERE user_id = $1
    FOR UPDATE
";

const UPSERT_TOKEN: &str = r"
    INSERT INTO refresh_tokens (user_id, token_hash, expires_at)
    VALUES ($1, $2, $3)
    ON CONFLICT (user_id) DO UPDATE
    SET token_hash = EXCLUDED.token_hash,
        expires_at = EXCLUDED.expires_at,
        updated_at = NOW()
";

#[derive(sqlx::FromRow)]
struct RefreshTokenRow {
    id: i64,
    user_id: Uuid,
    token_hash: String,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<RefreshTokenRow> for RefreshTokenRecord {
    fn from(row: RefreshTokenRow) -> Self {
        Self {
            id: RefreshTokenId::new(row.id),
            user_id: UserId::new(row.user_id),
            token_hash: row.token_hash,
            expires_at: row.expires_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl RefreshTokenStore for PgTxStore {
    async fn find_by_user(
        &mut self,
        user_id: UserId,
    ) -> Result<Option<RefreshTokenRecord>, RepositoryError> {
        let row = sqlx::query_as::<_, RefreshTokenRow>(SELECT_FOR_UPDATE)
            .bind(user_id.as_uuid())
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(row.map(RefreshTokenRecord::from))
    }

    async fn upsert(
        &mut self,
        user_id: UserId,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(UPSERT_TOKEN)
            .bind(user_id.as_uuid())
            .bind(token_hash)
            .bind(expires_at)
            .execute(&mut *self.tx)
            .await?;

        Ok(())
    }
}

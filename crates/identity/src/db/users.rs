//! User queries.
//!
//! Every query takes a `&mut PgConnection` so the same SQL serves both
//! the pool-backed reader and the transaction-scoped store.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use bazaar_core::{PhoneNumber, Role, UserId};

use super::tx::PgTxStore;
use super::{RepositoryError, UserDirectory};
use crate::models::User;

const SELECT_USER_BY_PHONE: &str = r"
    SELECT id, phone, password_hash, name, surname, created_at, updated_at
    FROM users
    WHERE phone = $1
";

const SELECT_USER_BY_ID: &str = r"
    SELECT id, phone, password_hash, name, surname, created_at, updated_at
    FROM users
    WHERE id = $1
";

const SELECT_ROLES: &str = r"
    SELECT role FROM user_roles
    WHERE user_id = $1
    ORDER BY granted_at ASC, id ASC
";

const INSERT_USER: &str = r"
    INSERT INTO users (id, phone, password_hash, name, surname, created_at, updated_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7)
";

const INSERT_ROLE: &str = r"
    INSERT INTO user_roles (user_id, role)
    VALUES ($1, $2)
    ON CONFLICT (user_id, role) DO NOTHING
";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    phone: String,
    password_hash: String,
    name: String,
    surname: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn map_user(row: UserRow, roles: Vec<String>) -> Result<User, RepositoryError> {
    let phone = PhoneNumber::parse(&row.phone)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid phone in database: {e}")))?;

    let roles = roles
        .iter()
        .map(|r| Role::from_str(r))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid role in database: {e}")))?;

    Ok(User {
        id: UserId::new(row.id),
        phone,
        password_hash: row.password_hash,
        name: row.name,
        surname: row.surname,
        roles,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

async fn load_user(
    conn: &mut PgConnection,
    row: Option<UserRow>,
) -> Result<Option<User>, RepositoryError> {
    let Some(row) = row else {
        return Ok(None);
    };

    let roles = sqlx::query_scalar::<_, String>(SELECT_ROLES)
        .bind(row.id)
        .fetch_all(&mut *conn)
        .await?;

    Ok(Some(map_user(row, roles)?))
}

async fn fetch_by_phone(
    conn: &mut PgConnection,
    phone: &PhoneNumber,
) -> Result<Option<User>, RepositoryError> {
    let row = sqlx::query_as::<_, UserRow>(SELECT_USER_BY_PHONE)
        .bind(phone.as_str())
        .fetch_optional(&mut *conn)
        .await?;

    load_user(conn, row).await
}

async fn fetch_by_id(conn: &mut PgConnection, id: UserId) -> Result<Option<User>, RepositoryError> {
    let row = sqlx::query_as::<_, UserRow>(SELECT_USER_BY_ID)
        .bind(id.as_uuid())
        .fetch_optional(&mut *conn)
        .await?;

    load_user(conn, row).await
}

async fn insert_user(conn: &mut PgConnection, user: &User) -> Result<(), RepositoryError> {
    sqlx::query(INSERT_USER)
        .bind(user.id.as_uuid())
        .bind(user.phone.as_str())
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(&user.surname)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("phone already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

    for role in &user.roles {
        grant_role(conn, user.id, *role).await?;
    }

    Ok(())
}

async fn grant_role(conn: &mut PgConnection, id: UserId, role: Role) -> Result<(), RepositoryError> {
    sqlx::query(INSERT_ROLE)
        .bind(id.as_uuid())
        .bind(role.as_str())
        .execute(&mut *conn)
        .await?;

    Ok(())
}

/// Pool-backed user reader.
///
/// The write methods open a short transaction of their own; the
/// orchestration layer uses them only through [`PgTxStore`], which
/// shares one transaction across stores.
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    /// Create a new user directory over the given pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl UserDirectory for PgUserDirectory {
    async fn find_by_phone(&mut self, phone: &PhoneNumber) -> Result<Option<User>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        fetch_by_phone(&mut conn, phone).await
    }

    async fn find_by_id(&mut self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        fetch_by_id(&mut conn, id).await
    }

    async fn insert(&mut self, user: &User) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        insert_user(&mut tx, user).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn add_role(&mut self, id: UserId, role: Role) -> Result<(), RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        grant_role(&mut conn, id, role).await
    }
}

impl UserDirectory for PgTxStore {
    async fn find_by_phone(&mut self, phone: &PhoneNumber) -> Result<Option<User>, RepositoryError> {
        fetch_by_phone(&mut self.tx, phone).await
    }

    async fn find_by_id(&mut self, id: UserId) -> Result<Option<User>, RepositoryError> {
        fetch_by_id(&mut self.tx, id).await
    }

    async fn insert(&mut self, user: &User) -> Result<(), RepositoryError> {
        insert_user(&mut self.tx, user).await
    }

    async fn add_role(&mut self, id: UserId, role: Role) -> Result<(), RepositoryError> {
        grant_role(&mut self.tx, id, role).await
    }
}

//! Database migration commands.
//!
//! # Usage
//!
//! ```bash
//! bz-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `BAZAAR_DATABASE_URL` - `PostgreSQL` connection string for the
//!   identity database (falls back to `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Identity migrations: `crates/identity/migrations/`
//!
//! ```text
//! migrations/
//! ├── 20260214000001_create_users.sql
//! ├── 20260214000002_create_user_roles.sql
//! ├── 20260214000003_create_refresh_tokens.sql
//! └── 20260214000004_create_outbox_events.sql
//! ```

use sqlx::PgPool;

/// Errors from applying migrations.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run identity database migrations.
///
/// # Errors
///
/// Returns `MigrationError` if the database URL is missing, the
/// connection fails, or a migration fails to apply.
pub async fn identity() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("BAZAAR_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| MigrationError::MissingEnvVar("BAZAAR_DATABASE_URL"))?;

    tracing::info!("Connecting to identity database...");
    let pool = PgPool::connect(&database_url).await?;

    tracing::info!("Running identity migrations...");
    sqlx::migrate!("../identity/migrations").run(&pool).await?;

    tracing::info!("Identity migrations complete!");
    Ok(())
}

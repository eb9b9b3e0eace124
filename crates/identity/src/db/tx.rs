//! Transactional unit of work over `PostgreSQL`.
//!
//! [`PgUnitOfWork`] is the production implementation of
//! [`UnitOfWork`]: readers run against the pool, write sequences run
//! through a [`PgTxStore`] bound to one `sqlx` transaction. A
//! `PgTxStore` that is dropped without [`StoreTx::commit`] rolls back
//! when the underlying transaction drops, so an early return anywhere
//! in an orchestration function aborts the whole operation.

use sqlx::{PgPool, Postgres, Transaction};

use super::users::PgUserDirectory;
use super::{RepositoryError, StoreTx, UnitOfWork};

/// Pool-backed [`UnitOfWork`] implementation.
#[derive(Clone)]
pub struct PgUnitOfWork {
    pool: PgPool,
}

impl PgUnitOfWork {
    /// Create a unit of work over the given pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl UnitOfWork for PgUnitOfWork {
    type Reader = PgUserDirectory;
    type Tx = PgTxStore;

    fn reader(&self) -> PgUserDirectory {
        PgUserDirectory::new(self.pool.clone())
    }

    async fn begin(&self) -> Result<PgTxStore, RepositoryError> {
        let tx = self.pool.begin().await?;
        Ok(PgTxStore { tx })
    }
}

/// Store bundle scoped to one open transaction.
///
/// Implements [`super::UserDirectory`], [`super::RefreshTokenStore`]
/// and [`super::EventSink`] (in their entity modules); every query
/// runs on the wrapped transaction.
pub struct PgTxStore {
    pub(super) tx: Transaction<'static, Postgres>,
}

impl StoreTx for PgTxStore {
    async fn commit(self) -> Result<(), RepositoryError> {
        self.tx.commit().await?;
        Ok(())
    }
}

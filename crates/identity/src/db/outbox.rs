//! Outbox event queries.
//!
//! Events only ever get written through the transaction-scoped store,
//! so a committed state change and its event are inseparable.

use sqlx::types::Json;

use super::tx::PgTxStore;
use super::{EventSink, RepositoryError};
use crate::models::{EventKind, UserSnapshot};

const INSERT_EVENT: &str = r"
    INSERT INTO outbox_events (kind, payload)
    VALUES ($1, $2)
";

impl EventSink for PgTxStore {
    async fn append(
        &mut self,
        kind: EventKind,
        payload: &UserSnapshot,
    ) -> Result<(), RepositoryError> {
        sqlx::query(INSERT_EVENT)
            .bind(kind.as_str())
            .bind(Json(payload))
            .execute(&mut *self.tx)
            .await?;

        Ok(())
    }
}

//! In-memory [`UnitOfWork`] used by unit tests.
//!
//! `begin` clones the committed state; writes go to the clone and
//! only replace the shared state on commit. Dropping a transaction
//! without committing discards the clone, which gives tests real
//! rollback behavior to assert against. [`FailPoint`] injects a
//! storage error at a chosen step.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use bazaar_core::{PhoneNumber, RefreshTokenId, Role, UserId};

use super::{EventSink, RefreshTokenStore, RepositoryError, StoreTx, UnitOfWork, UserDirectory};
use crate::models::{EventKind, RefreshTokenRecord, User, UserSnapshot};

/// Step at which the fake should return a storage error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailPoint {
    #[default]
    None,
    OnInsertUser,
    OnUpsertToken,
    OnAppendEvent,
    OnCommit,
}

/// An event captured by the fake sink.
#[derive(Debug, Clone)]
pub struct RecordedEvent {
    pub kind: EventKind,
    pub payload: UserSnapshot,
}

/// Committed store contents.
#[derive(Debug, Clone, Default)]
pub struct MemState {
    pub users: Vec<User>,
    pub tokens: HashMap<UserId, RefreshTokenRecord>,
    pub events: Vec<RecordedEvent>,
    next_token_id: i64,
}

fn injected_error() -> RepositoryError {
    RepositoryError::Database(sqlx::Error::PoolClosed)
}

fn find_user(users: &[User], pred: impl Fn(&User) -> bool) -> Option<User> {
    users.iter().find(|u| pred(u)).cloned()
}

#[derive(Clone, Default)]
pub struct MemUnitOfWork {
    state: Arc<Mutex<MemState>>,
    fail: Arc<Mutex<FailPoint>>,
}

impl MemUnitOfWork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inject a failure at the given step for subsequent transactions.
    pub fn fail_on(&self, point: FailPoint) {
        *self.fail.lock().unwrap() = point;
    }

    /// Clone of the committed state, for assertions.
    pub fn snapshot(&self) -> MemState {
        self.state.lock().unwrap().clone()
    }

    /// Put a user directly into committed state, bypassing transactions.
    pub fn seed_user(&self, user: User) {
        self.state.lock().unwrap().users.push(user);
    }
}

impl UnitOfWork for MemUnitOfWork {
    type Reader = MemReader;
    type Tx = MemTx;

    fn reader(&self) -> MemReader {
        MemReader {
            state: Arc::clone(&self.state),
        }
    }

    async fn begin(&self) -> Result<MemTx, RepositoryError> {
        let staged = self.state.lock().unwrap().clone();
        Ok(MemTx {
            shared: Arc::clone(&self.state),
            staged,
            fail: *self.fail.lock().unwrap(),
        })
    }
}

/// Read view over committed state.
pub struct MemReader {
    state: Arc<Mutex<MemState>>,
}

impl UserDirectory for MemReader {
    async fn find_by_phone(&mut self, phone: &PhoneNumber) -> Result<Option<User>, RepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(find_user(&state.users, |u| u.phone == *phone))
    }

    async fn find_by_id(&mut self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(find_user(&state.users, |u| u.id == id))
    }

    async fn insert(&mut self, user: &User) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().unwrap();
        insert_into(&mut state, user)
    }

    async fn add_role(&mut self, id: UserId, role: Role) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().unwrap();
        add_role_in(&mut state, id, role)
    }
}

fn insert_into(state: &mut MemState, user: &User) -> Result<(), RepositoryError> {
    if state.users.iter().any(|u| u.phone == user.phone) {
        return Err(RepositoryError::Conflict("phone already exists".to_owned()));
    }
    state.users.push(user.clone());
    Ok(())
}

fn add_role_in(state: &mut MemState, id: UserId, role: Role) -> Result<(), RepositoryError> {
    let user = state
        .users
        .iter_mut()
        .find(|u| u.id == id)
        .ok_or(RepositoryError::NotFound)?;
    if !user.roles.contains(&role) {
        user.roles.push(role);
    }
    Ok(())
}

/// Transaction-scoped view: writes stage against a clone and publish
/// on commit.
pub struct MemTx {
    shared: Arc<Mutex<MemState>>,
    staged: MemState,
    fail: FailPoint,
}

impl UserDirectory for MemTx {
    async fn find_by_phone(&mut self, phone: &PhoneNumber) -> Result<Option<User>, RepositoryError> {
        Ok(find_user(&self.staged.users, |u| u.phone == *phone))
    }

    async fn find_by_id(&mut self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(find_user(&self.staged.users, |u| u.id == id))
    }

    async fn insert(&mut self, user: &User) -> Result<(), RepositoryError> {
        if self.fail == FailPoint::OnInsertUser {
            return Err(injected_error());
        }
        insert_into(&mut self.staged, user)
    }

    async fn add_role(&mut self, id: UserId, role: Role) -> Result<(), RepositoryError> {
        add_role_in(&mut self.staged, id, role)
    }
}

impl RefreshTokenStore for MemTx {
    async fn find_by_user(
        &mut self,
        user_id: UserId,
    ) -> Result<Option<RefreshTokenRecord>, RepositoryError> {
        Ok(self.staged.tokens.get(&user_id).cloned())
    }

    async fn upsert(
        &mut self,
        user_id: UserId,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        if self.fail == FailPoint::OnUpsertToken {
            return Err(injected_error());
        }

        let now = Utc::now();
        if let Some(existing) = self.staged.tokens.get_mut(&user_id) {
            existing.token_hash = token_hash.to_owned();
            existing.expires_at = expires_at;
            existing.updated_at = now;
        } else {
            self.staged.next_token_id += 1;
            self.staged.tokens.insert(
                user_id,
                RefreshTokenRecord {
                    id: RefreshTokenId::new(self.staged.next_token_id),
                    user_id,
                    token_hash: token_hash.to_owned(),
                    expires_at,
                    created_at: now,
                    updated_at: now,
                },
            );
        }
        Ok(())
    }
}

impl EventSink for MemTx {
    async fn append(
        &mut self,
        kind: EventKind,
        payload: &UserSnapshot,
    ) -> Result<(), RepositoryError> {
        if self.fail == FailPoint::OnAppendEvent {
            return Err(injected_error());
        }
        self.staged.events.push(RecordedEvent {
            kind,
            payload: payload.clone(),
        });
        Ok(())
    }
}

impl StoreTx for MemTx {
    async fn commit(self) -> Result<(), RepositoryError> {
        if self.fail == FailPoint::OnCommit {
            return Err(injected_error());
        }
        *self.shared.lock().unwrap() = self.staged;
        Ok(())
    }
}

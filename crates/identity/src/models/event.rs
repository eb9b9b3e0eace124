//! Outbox event types.
//!
//! Events are appended to the `outbox_events` table in the same
//! transaction as the state change they describe. A downstream relay
//! (not part of this service) drains the table.

use serde::{Deserialize, Serialize};

use bazaar_core::{Role, UserId};

use super::user::User;

/// The closed set of domain events this service emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A new account was created.
    UserRegistered,
    /// A user authenticated with phone and password.
    UserLoggedIn,
    /// A user was granted the seller role.
    UserBecameSeller,
}

impl EventKind {
    /// Stable string form stored in the `kind` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UserRegistered => "UserRegistered",
            Self::UserLoggedIn => "UserLoggedIn",
            Self::UserBecameSeller => "UserBecameSeller",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of a user at event time, serialized into the event payload.
///
/// Deliberately excludes the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSnapshot {
    /// The user's ID.
    pub user_id: UserId,
    /// Phone number at event time.
    pub phone: String,
    /// Given name at event time.
    pub name: String,
    /// Family name at event time.
    pub surname: String,
    /// Roles held at event time, including any granted by the
    /// operation that emitted the event.
    pub roles: Vec<Role>,
}

impl From<&User> for UserSnapshot {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            phone: user.phone.as_str().to_owned(),
            name: user.name.clone(),
            surname: user.surname.clone(),
            roles: user.roles.clone(),
        }
    }
}

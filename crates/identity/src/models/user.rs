//! User domain types.

use chrono::{DateTime, Utc};

use bazaar_core::{PhoneNumber, Role, UserId};

/// A Bazaar user (domain type).
///
/// Carries the stored password hash so the auth service can verify
/// credentials; the plaintext password never appears on this type.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID, assigned by the application at registration.
    pub id: UserId,
    /// Phone number used as the login identifier.
    pub phone: PhoneNumber,
    /// Argon2 hash of the user's password.
    pub password_hash: String,
    /// Given name.
    pub name: String,
    /// Family name.
    pub surname: String,
    /// Roles granted to this user. Every user holds at least
    /// [`Role::Customer`].
    pub roles: Vec<Role>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether this user holds the given role.
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Whether this user has been promoted to seller.
    #[must_use]
    pub fn is_seller(&self) -> bool {
        self.has_role(Role::Seller)
    }
}

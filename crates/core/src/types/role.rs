//! Role labels for Bazaar accounts.

use serde::{Deserialize, Serialize};

/// Error returned when a string is not a known role label.
#[derive(thiserror::Error, Debug, Clone)]
#[error("unknown role: {0}")]
pub struct RoleError(pub String);

/// A role label attached to a user account.
///
/// Every account starts with [`Role::Customer`]; further roles are added by
/// promotion and never removed. Stored as plain text in the database, so the
/// string forms here are a wire format and must stay stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Default role for every registered account.
    Customer,
    /// Granted by promotion; allows listing goods for sale.
    Seller,
    /// Operational staff.
    Admin,
}

impl Role {
    /// The stable string form used in storage and token claims.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Seller => "seller",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "seller" => Ok(Self::Seller),
            "admin" => Ok(Self::Admin),
            _ => Err(RoleError(s.to_owned())),
        }
    }
}

//! Domain models for the identity service.
//!
//! These types represent validated domain objects separate from
//! database row types (row mapping lives in [`crate::db`]).

pub mod event;
pub mod token;
pub mod user;

pub use event::{EventKind, UserSnapshot};
pub use token::{IssuedTokens, RefreshTokenRecord};
pub use user::User;

//! Core types for Bazaar.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod phone;
pub mod role;

pub use id::*;
pub use phone::{PhoneError, PhoneNumber};
pub use role::{Role, RoleError};

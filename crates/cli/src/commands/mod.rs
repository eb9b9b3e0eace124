//! CLI command implementations.

pub mod jwks;
pub mod migrate;

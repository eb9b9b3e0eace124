//! Bazaar identity library.
//!
//! This crate provides the identity service as a library, allowing it
//! to be tested and reused (the CLI embeds its migrations).

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

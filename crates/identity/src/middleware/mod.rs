//! HTTP middleware stack for the identity service.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//!
//! Identity resolution happens upstream: the gateway verifies the
//! caller's access token and forwards the subject as an `X-User-Id`
//! header. The [`ActingUser`] extractor reads it back.

pub mod identity;

pub use identity::{ActingUser, USER_ID_HEADER};

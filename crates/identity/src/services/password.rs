//! Secret hashing using Argon2id.
//!
//! One primitive serves two purposes: login passwords and refresh
//! tokens at rest. Default argon2 parameters are tuned for
//! interactive latency, which fits both since refresh verification
//! runs at a similar frequency to login.

use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use thiserror::Error;

/// Failure inside the hashing primitive. Not reachable for
/// well-formed inputs with default parameters.
#[derive(Debug, Error)]
#[error("failed to hash secret")]
pub struct HashError;

/// Argon2id hasher for passwords and refresh tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordHasher;

impl PasswordHasher {
    /// Create a hasher with default parameters.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Hash a secret with a fresh random salt.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the argon2 primitive rejects its
    /// parameters.
    pub fn hash(&self, plaintext: &str) -> Result<String, HashError> {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|_| HashError)
    }

    /// Verify a secret against a stored digest.
    ///
    /// A malformed digest verifies as `false` rather than erroring, so
    /// corrupt rows degrade to an authentication failure.
    #[must_use]
    pub fn verify(&self, plaintext: &str, digest: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(digest) else {
            return false;
        };

        Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_roundtrip() {
        let hasher = PasswordHasher::new();
        let digest = hasher.hash("password123").unwrap();

        assert!(digest.starts_with("$argon2"));
        assert!(hasher.verify("password123", &digest));
        assert!(!hasher.verify("wrongpass", &digest));
    }

    #[test]
    fn hashing_salts_internally() {
        let hasher = PasswordHasher::new();
        let a = hasher.hash("password123").unwrap();
        let b = hasher.hash("password123").unwrap();

        assert_ne!(a, b);
        assert!(hasher.verify("password123", &a));
        assert!(hasher.verify("password123", &b));
    }

    #[test]
    fn malformed_digest_verifies_false() {
        let hasher = PasswordHasher::new();

        assert!(!hasher.verify("password123", "not-a-digest"));
        assert!(!hasher.verify("password123", ""));
        assert!(!hasher.verify("password123", "$argon2id$garbage"));
    }

    #[test]
    fn same_primitive_covers_opaque_tokens() {
        let hasher = PasswordHasher::new();
        let token = "dGhpcy1pcy1hLXJlZnJlc2gtdG9rZW4";
        let digest = hasher.hash(token).unwrap();

        assert!(hasher.verify(token, &digest));
        assert!(!hasher.verify("dGhpcy1pcy1hLXdyb25nLXRva2Vu", &digest));
    }
}

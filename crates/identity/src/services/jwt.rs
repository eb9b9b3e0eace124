//! RS256 access token signing.
//!
//! The signing key is loaded once at startup from PEM. Tokens carry a
//! `kid` header so verifiers can pick the right key from the JWKS
//! document this service publishes; verification itself needs only
//! the public key and happens in other services.

use std::time::Duration;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use rsa::RsaPrivateKey;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::traits::PublicKeyParts;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use bazaar_core::{Role, UserId};

/// Errors loading the signing key at startup.
#[derive(Debug, Error)]
pub enum KeyError {
    /// The PEM is not a parseable RSA private key.
    #[error("invalid RSA private key: {0}")]
    InvalidKey(String),

    /// jsonwebtoken rejected the key material.
    #[error("failed to prepare signing key: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

/// Claims embedded in every access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject: the user's ID.
    pub sub: String,
    /// Roles held at issuance.
    pub roles: Vec<Role>,
    /// Issuer.
    pub iss: String,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
    /// Expiry, seconds since epoch.
    pub exp: i64,
}

/// A single JSON Web Key (RSA, signature use).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jwk {
    pub kty: String,
    #[serde(rename = "use")]
    pub use_: String,
    pub alg: String,
    pub kid: String,
    pub n: String,
    pub e: String,
}

/// The JWKS document served at `/.well-known/jwks.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwkSet {
    pub keys: Vec<Jwk>,
}

/// Signs short-lived access tokens with an RSA private key.
#[derive(Clone)]
pub struct AccessTokenSigner {
    encoding_key: EncodingKey,
    kid: String,
    issuer: String,
    ttl: Duration,
    jwks: JwkSet,
}

impl AccessTokenSigner {
    /// Load the signer from a PEM-encoded RSA private key.
    ///
    /// Accepts PKCS#8 (`BEGIN PRIVATE KEY`) and PKCS#1
    /// (`BEGIN RSA PRIVATE KEY`). The matching public key is derived
    /// here once to build the JWKS document.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError`] if the PEM does not contain a usable RSA
    /// private key.
    pub fn from_pem(
        private_key_pem: &str,
        kid: &str,
        issuer: &str,
        ttl: Duration,
    ) -> Result<Self, KeyError> {
        let private_key = RsaPrivateKey::from_pkcs8_pem(private_key_pem)
            .or_else(|_| RsaPrivateKey::from_pkcs1_pem(private_key_pem))
            .map_err(|e| KeyError::InvalidKey(e.to_string()))?;

        let public_key = private_key.to_public_key();
        let jwk = Jwk {
            kty: "RSA".to_owned(),
            use_: "sig".to_owned(),
            alg: "RS256".to_owned(),
            kid: kid.to_owned(),
            n: URL_SAFE_NO_PAD.encode(public_key.n().to_bytes_be()),
            e: URL_SAFE_NO_PAD.encode(public_key.e().to_bytes_be()),
        };

        let encoding_key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())?;

        Ok(Self {
            encoding_key,
            kid: kid.to_owned(),
            issuer: issuer.to_owned(),
            ttl,
            jwks: JwkSet { keys: vec![jwk] },
        })
    }

    /// Mint a signed access token for the given subject and roles.
    ///
    /// # Errors
    ///
    /// Returns the underlying `jsonwebtoken` error if signing fails.
    pub fn generate_access_token(
        &self,
        user_id: UserId,
        roles: &[Role],
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let iat = Utc::now().timestamp();
        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);

        let claims = AccessClaims {
            sub: user_id.to_string(),
            roles: roles.to_vec(),
            iss: self.issuer.clone(),
            iat,
            exp: iat.saturating_add(ttl),
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(self.kid.clone());

        encode(&header, &claims, &self.encoding_key)
    }

    /// The published key set for this signer.
    #[must_use]
    pub const fn jwks(&self) -> &JwkSet {
        &self.jwks
    }

    /// Access token lifetime.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }
}

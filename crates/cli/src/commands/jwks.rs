//! JWKS export command.
//!
//! Prints the JSON Web Key Set for the configured signing key. Useful
//! for seeding a gateway or downstream-service key cache without a
//! running identity server.
//!
//! # Usage
//!
//! ```bash
//! bz-cli jwks
//! ```
//!
//! # Environment Variables
//!
//! - `BAZAAR_JWT_PRIVATE_KEY` - PEM-encoded RSA private key
//! - `BAZAAR_JWT_KID` - Key identifier (default: bazaar-1)

use secrecy::ExposeSecret;

use bazaar_identity::config::{ConfigError, JwtConfig};
use bazaar_identity::services::jwt::{AccessTokenSigner, KeyError};

/// Errors from exporting the key set.
#[derive(Debug, thiserror::Error)]
pub enum JwksError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Key error: {0}")]
    Key(#[from] KeyError),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Print the JWKS document for the configured signing key.
///
/// # Errors
///
/// Returns `JwksError` if the key cannot be loaded or parsed.
pub fn print() -> Result<(), JwksError> {
    dotenvy::dotenv().ok();

    // Issuer and TTL play no part in the key set itself
    let jwt = JwtConfig::from_env()?;
    let signer = AccessTokenSigner::from_pem(
        jwt.private_key_pem.expose_secret(),
        &jwt.kid,
        &jwt.issuer,
        jwt.access_ttl(),
    )?;

    let document = serde_json::to_string_pretty(signer.jwks())?;

    #[allow(clippy::print_stdout)]
    {
        println!("{document}");
    }

    Ok(())
}

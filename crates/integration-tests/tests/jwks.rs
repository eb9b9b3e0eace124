//! Integration tests for signing key discovery.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The identity server running (cargo run -p bazaar-identity)
//!
//! Run with: cargo test -p bazaar-integration-tests -- --ignored

use bazaar_integration_tests::TestContext;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use reqwest::StatusCode;
use serde_json::Value;

async fn fetch_jwks(ctx: &TestContext) -> Value {
    let resp = ctx
        .client
        .get(format!("{}/.well-known/jwks.json", ctx.base_url))
        .send()
        .await
        .expect("Failed to fetch JWKS");
    assert_eq!(resp.status(), StatusCode::OK);
    resp.json().await.expect("Failed to parse JWKS")
}

#[tokio::test]
#[ignore = "Requires running identity server and PostgreSQL"]
async fn test_jwks_document_shape() {
    let ctx = TestContext::new();
    let jwks = fetch_jwks(&ctx).await;

    let key = &jwks["keys"][0];
    assert_eq!(key["kty"].as_str(), Some("RSA"));
    assert_eq!(key["use"].as_str(), Some("sig"));
    assert_eq!(key["alg"].as_str(), Some("RS256"));
    assert!(key["kid"].as_str().is_some());
    assert!(key["n"].as_str().is_some());
    assert_eq!(key["e"].as_str(), Some("AQAB"));
}

#[tokio::test]
#[ignore = "Requires running identity server and PostgreSQL"]
async fn test_access_tokens_verify_against_the_published_key() {
    let ctx = TestContext::new();
    let (user_id, tokens) = ctx.register_and_login().await;
    let access_token = tokens["access_token"]
        .as_str()
        .expect("Missing access token");

    let jwks = fetch_jwks(&ctx).await;
    let key = &jwks["keys"][0];

    // The token header points at the published key
    let header = decode_header(access_token).expect("Failed to decode token header");
    assert_eq!(header.alg, Algorithm::RS256);
    assert_eq!(header.kid.as_deref(), key["kid"].as_str());

    // And the signature checks out against n/e from the document
    let decoding_key = DecodingKey::from_rsa_components(
        key["n"].as_str().expect("Missing modulus"),
        key["e"].as_str().expect("Missing exponent"),
    )
    .expect("Failed to build decoding key");

    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_required_spec_claims(&["exp"]);

    let claims = decode::<Value>(access_token, &decoding_key, &validation)
        .expect("Token failed verification")
        .claims;

    assert_eq!(claims["sub"].as_str(), Some(user_id.as_str()));
    assert!(
        claims["roles"]
            .as_array()
            .expect("Missing roles claim")
            .contains(&Value::String("customer".to_string()))
    );
}

//! Integration tests for the Bazaar identity service.
//!
//! # Running Tests
//!
//! ```bash
//! # Apply migrations, then start the server
//! cargo run -p bazaar-cli -- migrate
//! cargo run -p bazaar-identity
//!
//! # Run the flows (ignored by default)
//! cargo test -p bazaar-integration-tests -- --ignored
//! ```
//!
//! Tests drive a live server over HTTP and leave their registered
//! users behind; point `IDENTITY_BASE_URL` at a disposable deployment.

#![cfg_attr(not(test), forbid(unsafe_code))]

use reqwest::{Client, Response};
use serde_json::{Value, json};

/// Password used for every account the tests create.
pub const TEST_PASSWORD: &str = "password123";

/// Shared context for driving the identity API.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
}

impl TestContext {
    /// Create a context against `IDENTITY_BASE_URL`
    /// (default `http://localhost:8080`).
    #[must_use]
    pub fn new() -> Self {
        let base_url = std::env::var("IDENTITY_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8080".to_string());
        Self {
            client: Client::new(),
            base_url,
        }
    }

    /// A phone number unlikely to collide with previous runs.
    #[must_use]
    pub fn unique_phone() -> String {
        format!("+998{:09}", rand::random::<u32>() % 1_000_000_000)
    }

    /// Register an account.
    ///
    /// # Panics
    ///
    /// Panics on transport errors.
    pub async fn register(&self, phone: &str, password: &str) -> Response {
        self.client
            .post(format!("{}/auth/register", self.base_url))
            .json(&json!({
                "phone": phone,
                "password": password,
                "name": "Test",
                "surname": "User",
            }))
            .send()
            .await
            .expect("Failed to send register request")
    }

    /// Log in with phone and password.
    ///
    /// # Panics
    ///
    /// Panics on transport errors.
    pub async fn login(&self, phone: &str, password: &str) -> Response {
        self.client
            .post(format!("{}/auth/login", self.base_url))
            .json(&json!({"phone": phone, "password": password}))
            .send()
            .await
            .expect("Failed to send login request")
    }

    /// Rotate a refresh token as the given user.
    ///
    /// # Panics
    ///
    /// Panics on transport errors.
    pub async fn refresh(&self, user_id: &str, refresh_token: &str) -> Response {
        self.client
            .post(format!("{}/auth/refresh", self.base_url))
            .header("X-User-Id", user_id)
            .json(&json!({"refresh_token": refresh_token}))
            .send()
            .await
            .expect("Failed to send refresh request")
    }

    /// Register a fresh user and log in, returning the user id and the
    /// issued token pair.
    ///
    /// # Panics
    ///
    /// Panics if either step does not succeed.
    pub async fn register_and_login(&self) -> (String, Value) {
        let phone = Self::unique_phone();

        let resp = self.register(&phone, TEST_PASSWORD).await;
        assert_eq!(resp.status(), reqwest::StatusCode::CREATED);
        let user: Value = resp.json().await.expect("Failed to parse user summary");
        let user_id = user["user_id"]
            .as_str()
            .expect("Register response missing user_id")
            .to_string();

        let resp = self.login(&phone, TEST_PASSWORD).await;
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        let tokens: Value = resp.json().await.expect("Failed to parse token pair");

        (user_id, tokens)
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

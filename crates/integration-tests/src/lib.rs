//! Integration tests for Pomelo.
//!
//! Tests run against a [`wiremock::MockServer`] standing in for both the
//! auth server and the API gateway (the paths don't overlap, so one server
//! plays both roles). Each test gets its own credential cache file under the
//! system temp directory.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p pomelo-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::unwrap_used)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};

use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pomelo_client::config::ClientConfig;
use pomelo_client::session::SessionManager;
use pomelo_client::store::CredentialCache;

static CACHE_COUNTER: AtomicU32 = AtomicU32::new(0);

/// A mock backend plus a client config pointing at it.
pub struct TestShop {
    pub server: MockServer,
    pub config: ClientConfig,
}

impl TestShop {
    /// Start a mock server and build a config with a fresh credential path.
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let n = CACHE_COUNTER.fetch_add(1, Ordering::SeqCst);
        let credentials_path: PathBuf = std::env::temp_dir().join(format!(
            "pomelo-integration-{}-{n}/credentials.json",
            std::process::id()
        ));

        let config = ClientConfig {
            auth_server_url: server.uri(),
            api_base_url: server.uri(),
            redirect_uri: "http://localhost:3000/callback".to_string(),
            scope: "READ WRITE".to_string(),
            client_id: "pomelo-test".to_string(),
            client_secret: SecretString::from("integration-t3st-s3cret"),
            credentials_path,
        };

        Self { server, config }
    }

    /// Build a session manager against this backend.
    pub fn manager(&self) -> SessionManager {
        SessionManager::new(&self.config).unwrap()
    }

    /// Seed the credential cache as if a login completed earlier.
    pub fn seed_credentials(&self, with_profile: bool) {
        let cache = CredentialCache {
            access_token: Some(pomelo_client::auth::AccessToken {
                access_token: "seeded-token".to_string(),
                token_type: "Bearer".to_string(),
                obtained_at: 1_700_000_000,
            }),
            user: with_profile.then(sample_profile),
        };
        cache.save(&self.config.credentials_path).unwrap();
    }

    /// Whether the credential cache file currently exists.
    pub fn credentials_on_disk(&self) -> bool {
        self.config.credentials_path.exists()
    }

    /// Remove the credential cache file.
    pub fn cleanup(&self) {
        CredentialCache::clear(&self.config.credentials_path).unwrap();
    }

    /// Mount a successful token exchange.
    pub async fn mock_token_endpoint(&self) {
        Mock::given(method("POST"))
            .and(path("/oauth2/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "test-access-token",
                "token_type": "Bearer"
            })))
            .mount(&self.server)
            .await;
    }

    /// Mount the profile endpoint with the given point balance.
    pub async fn mock_profile(&self, point_amount: f64) {
        Mock::given(method("GET"))
            .and(path("/user-service/info"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "ok",
                "data": profile_json(point_amount)
            })))
            .mount(&self.server)
            .await;
    }

    /// Mount the product catalog endpoint.
    pub async fn mock_products(&self) {
        Mock::given(method("GET"))
            .and(path("/product-service/all"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"productId": 1, "productName": "Pomelo", "unitPrice": 10.0, "productStock": 5},
                {"productId": 2, "productName": "Yuzu", "unitPrice": 5.5, "productStock": 0}
            ])))
            .mount(&self.server)
            .await;
    }
}

/// The profile used by seeded sessions and mock responses.
pub fn sample_profile() -> pomelo_client::api::UserProfile {
    serde_json::from_value(profile_json(120.5)).unwrap()
}

/// Profile JSON in the backend's wire shape.
pub fn profile_json(point_amount: f64) -> serde_json::Value {
    json!({
        "userId": "u-1",
        "name": "Alice",
        "email": "alice@example.com",
        "phone": "555-0100",
        "pointAmount": point_amount,
        "accountId": 7
    })
}

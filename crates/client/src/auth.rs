//! OAuth2 Authorization Code client for the shop's auth server.
//!
//! # OAuth Flow
//!
//! 1. Build a login request with `login_request()` (authorization URL plus
//!    fresh `state`/`nonce`)
//! 2. Navigate the user agent to the URL
//! 3. The auth server redirects back with an authorization code
//! 4. Exchange the code for a token with `exchange_code()`
//! 5. Use the access token as a bearer credential for API calls
//!
//! The client is confidential: token exchange authenticates with HTTP Basic
//! credentials (client id/secret), not PKCE.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::Utc;
use rand::Rng;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

/// Length of the opaque `state` and `nonce` strings.
const STATE_NONCE_LENGTH: usize = 32;

/// Access token obtained via the authorization code exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    /// The access token for API requests.
    pub access_token: String,
    /// The token type (always `Bearer` for this backend).
    pub token_type: String,
    /// Unix timestamp when the token was obtained.
    pub obtained_at: i64,
}

/// Raw token response from the auth server.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    token_type: String,
}

/// A prepared authorization request.
///
/// `state` and `nonce` are single-use; the caller should hold them until the
/// callback arrives and verify `state` against the redirect parameters.
#[derive(Debug, Clone)]
pub struct LoginRequest {
    /// Full authorization URL to navigate the user agent to.
    pub url: String,
    /// CSRF protection token embedded in the URL.
    pub state: String,
    /// OpenID Connect replay protection token embedded in the URL.
    pub nonce: String,
}

/// Generate a random alphanumeric string for `state`/`nonce` parameters.
#[must_use]
pub fn generate_random_string(length: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            char::from(CHARSET[idx])
        })
        .collect()
}

/// Client for the auth server's OAuth2 endpoints.
#[derive(Clone)]
pub struct AuthClient {
    inner: Arc<AuthClientInner>,
}

struct AuthClientInner {
    client: reqwest::Client,
    auth_server_url: String,
    redirect_uri: String,
    scope: String,
    client_id: String,
    client_secret: String,
}

impl AuthClient {
    /// Create a new auth client.
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_http_client(config, reqwest::Client::new())
    }

    /// Create a new auth client with a caller-supplied HTTP client.
    #[must_use]
    pub fn with_http_client(config: &ClientConfig, client: reqwest::Client) -> Self {
        Self {
            inner: Arc::new(AuthClientInner {
                client,
                auth_server_url: config.auth_server_url.clone(),
                redirect_uri: config.redirect_uri.clone(),
                scope: config.scope.clone(),
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.expose_secret().to_string(),
            }),
        }
    }

    /// Get the OAuth client ID (safe to expose).
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.inner.client_id
    }

    /// Build an authorization request with fresh `state` and `nonce`.
    #[must_use]
    pub fn login_request(&self) -> LoginRequest {
        let state = generate_random_string(STATE_NONCE_LENGTH);
        let nonce = generate_random_string(STATE_NONCE_LENGTH);
        let url = self.authorization_url(&state, &nonce);
        LoginRequest { url, state, nonce }
    }

    /// Generate the authorization URL for login.
    ///
    /// # Arguments
    ///
    /// * `state` - A random string held by the caller to prevent CSRF attacks
    /// * `nonce` - A random string for `OpenID` Connect replay protection
    #[must_use]
    pub fn authorization_url(&self, state: &str, nonce: &str) -> String {
        format!(
            "{}/oauth2/authorize?\
            client_id={}&\
            redirect_uri={}&\
            scope={}&\
            response_type=code&\
            response_mode=form_post&\
            state={}&\
            nonce={}",
            self.inner.auth_server_url,
            urlencoding::encode(&self.inner.client_id),
            urlencoding::encode(&self.inner.redirect_uri),
            urlencoding::encode(&self.inner.scope),
            urlencoding::encode(state),
            urlencoding::encode(nonce)
        )
    }

    /// Exchange an authorization code for an access token.
    ///
    /// The request authenticates with HTTP Basic credentials (client
    /// id/secret) and posts an `application/x-www-form-urlencoded` body with
    /// `grant_type=authorization_code`.
    ///
    /// # Errors
    ///
    /// Returns `TokenExchangeFailed` if the code is empty or the auth server
    /// rejects the exchange.
    pub async fn exchange_code(&self, code: &str) -> Result<AccessToken> {
        if code.trim().is_empty() {
            return Err(ClientError::TokenExchangeFailed(
                "empty authorization code".to_string(),
            ));
        }

        let url = format!("{}/oauth2/token", self.inner.auth_server_url);
        let credentials = BASE64.encode(format!(
            "{}:{}",
            self.inner.client_id, self.inner.client_secret
        ));

        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", &self.inner.redirect_uri),
        ];

        let response = self
            .inner
            .client
            .post(&url)
            .header("Authorization", format!("Basic {credentials}"))
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            tracing::warn!(%status, "token exchange rejected by auth server");
            return Err(ClientError::TokenExchangeFailed(format!(
                "auth server returned {status}: {text}"
            )));
        }

        let token_response: TokenResponse = response.json().await?;

        Ok(AccessToken {
            access_token: token_response.access_token,
            token_type: token_response.token_type,
            obtained_at: Utc::now().timestamp(),
        })
    }
}

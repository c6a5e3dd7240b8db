//! Session state machine and lifecycle manager.
//!
//! Authentication state lives in a pure reducer: [`Session`] is a value,
//! [`SessionEvent`] is the tagged event set, and [`Session::apply`] is the
//! transition function. [`SessionManager`] owns the current `Session`, the
//! OAuth and API clients, and the on-disk credential cache, and funnels every
//! mutation through `apply`.
//!
//! # Lifecycle
//!
//! ```text
//! ANONYMOUS --login_request/complete_login--> AUTHENTICATED
//! AUTHENTICATED --logout / profile-load failure / 401--> ANONYMOUS
//! ```
//!
//! A 401 on any authenticated call tears the whole session down (credentials
//! cleared, state reset); callers see [`ClientError::SessionExpired`] and
//! should not retry.

use std::path::PathBuf;

use crate::api::{ApiClient, CreateOrderRequest, Order, Product, UserProfile};
use crate::auth::{AccessToken, AuthClient, LoginRequest};
use crate::cart::Cart;
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::store::CredentialCache;

/// Authentication state snapshot.
///
/// `authenticated` is true iff `access_token` is held and a successful
/// login or profile load has completed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    /// Whether a login/load has completed for the held token.
    pub authenticated: bool,
    /// The bearer token for API calls, if any.
    pub access_token: Option<AccessToken>,
    /// The last successfully fetched profile.
    pub user: Option<UserProfile>,
    /// Whether a login or profile load is in flight.
    pub loading: bool,
}

/// Events that drive session transitions.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    LoginStart,
    LoginSuccess {
        token: AccessToken,
        user: UserProfile,
    },
    LoginFailure,
    Logout,
    LoadUserStart,
    LoadUserSuccess(UserProfile),
    LoadUserFailure,
}

impl Session {
    /// Rebuild a session from persisted credentials at startup.
    ///
    /// A cached profile proves a load completed for the cached token, so the
    /// pair hydrates straight to authenticated; a bare token stays
    /// unauthenticated until the startup refresh confirms it.
    #[must_use]
    pub fn hydrated(cache: &CredentialCache) -> Self {
        let authenticated = cache.access_token.is_some() && cache.user.is_some();
        Self {
            authenticated,
            access_token: cache.access_token.clone(),
            user: cache.user.clone(),
            loading: false,
        }
    }

    /// Pure transition function: current state + event -> next state.
    #[must_use]
    pub fn apply(&self, event: SessionEvent) -> Self {
        match event {
            SessionEvent::LoginStart | SessionEvent::LoadUserStart => Self {
                loading: true,
                ..self.clone()
            },
            SessionEvent::LoginSuccess { token, user } => Self {
                authenticated: true,
                access_token: Some(token),
                user: Some(user),
                loading: false,
            },
            SessionEvent::LoginFailure => Self {
                authenticated: false,
                access_token: None,
                user: None,
                loading: false,
            },
            SessionEvent::Logout => Self {
                authenticated: false,
                access_token: None,
                user: None,
                loading: self.loading,
            },
            SessionEvent::LoadUserSuccess(user) => Self {
                authenticated: self.access_token.is_some(),
                user: Some(user),
                loading: false,
                ..self.clone()
            },
            SessionEvent::LoadUserFailure => Self {
                loading: false,
                ..self.clone()
            },
        }
    }
}

/// Owns the session state and every operation that mutates it.
pub struct SessionManager {
    auth: AuthClient,
    api: ApiClient,
    credentials_path: PathBuf,
    session: Session,
    initialized: bool,
}

impl SessionManager {
    /// Create a manager, hydrating session state from the credential cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the credential cache exists but cannot be read.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Self::with_clients(config, AuthClient::new(config), ApiClient::new(config))
    }

    /// Create a manager with caller-supplied clients (used by tests).
    ///
    /// # Errors
    ///
    /// Returns an error if the credential cache exists but cannot be read.
    pub fn with_clients(config: &ClientConfig, auth: AuthClient, api: ApiClient) -> Result<Self> {
        let cache = CredentialCache::load(&config.credentials_path)?;
        Ok(Self {
            auth,
            api,
            credentials_path: config.credentials_path.clone(),
            session: Session::hydrated(&cache),
            initialized: false,
        })
    }

    /// The current session snapshot.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Whether the session is authenticated.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.session.authenticated
    }

    /// The current user profile, if authenticated.
    #[must_use]
    pub const fn user(&self) -> Option<&UserProfile> {
        self.session.user.as_ref()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Login / Logout
    // ─────────────────────────────────────────────────────────────────────────

    /// Build the authorization request that starts a login.
    ///
    /// Navigation to the returned URL is the caller's responsibility; the
    /// auth server will redirect back with an authorization code.
    #[must_use]
    pub fn login_request(&self) -> LoginRequest {
        self.auth.login_request()
    }

    /// Exchange the callback code for a token and load the user profile.
    ///
    /// On success the session is AUTHENTICATED and credentials are persisted.
    /// Any failure mid-sequence resets the session to ANONYMOUS, clears
    /// persisted credentials, and propagates the error. Not retried.
    ///
    /// # Errors
    ///
    /// `TokenExchangeFailed` for an empty/invalid code, `ProfileFetchFailed`
    /// if the subsequent profile load fails.
    pub async fn complete_login(&mut self, code: &str) -> Result<UserProfile> {
        self.dispatch(SessionEvent::LoginStart);

        let token = match self.auth.exchange_code(code).await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "login failed during token exchange");
                self.abort_login()?;
                return Err(e);
            }
        };

        // Persist the token before the profile fetch so an interrupted login
        // can still be recovered by the startup refresh.
        self.persist(CredentialCache {
            access_token: Some(token.clone()),
            user: None,
        })?;

        let user = match self.api.get_profile(&token.access_token).await {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!(error = %e, "login failed during profile load");
                self.abort_login()?;
                return Err(e);
            }
        };

        self.persist(CredentialCache {
            access_token: Some(token.clone()),
            user: Some(user.clone()),
        })?;
        self.dispatch(SessionEvent::LoginSuccess {
            token,
            user: user.clone(),
        });
        tracing::info!("login completed");
        Ok(user)
    }

    /// Re-fetch the user profile for the held token.
    ///
    /// No-op without a token. A fetch failure is treated as fatal for the
    /// session: forced logout, then the error propagates. Not retried.
    ///
    /// # Errors
    ///
    /// `ProfileFetchFailed` or `SessionExpired` from the fetch.
    pub async fn refresh_profile(&mut self) -> Result<()> {
        let Some(token) = self.session.access_token.clone() else {
            return Ok(());
        };

        self.dispatch(SessionEvent::LoadUserStart);
        match self.api.get_profile(&token.access_token).await {
            Ok(user) => {
                self.persist(CredentialCache {
                    access_token: Some(token),
                    user: Some(user.clone()),
                })?;
                self.dispatch(SessionEvent::LoadUserSuccess(user));
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "profile refresh failed, forcing logout");
                self.dispatch(SessionEvent::LoadUserFailure);
                self.force_logout();
                Err(e)
            }
        }
    }

    /// Run the startup profile refresh at most once per manager lifetime.
    ///
    /// Repeated invocations are no-ops; the guard flips before the network
    /// call so overlapping triggers cannot double-fetch.
    ///
    /// # Errors
    ///
    /// Propagates `refresh_profile` errors.
    pub async fn ensure_initialized(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }
        self.initialized = true;

        if self.session.access_token.is_some() && self.session.user.is_none() {
            self.refresh_profile().await?;
        }
        Ok(())
    }

    /// Clear persisted credentials and reset to ANONYMOUS. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the credential cache file cannot be removed.
    pub fn logout(&mut self) -> Result<()> {
        CredentialCache::clear(&self.credentials_path)?;
        self.dispatch(SessionEvent::Logout);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Authenticated Calls
    // ─────────────────────────────────────────────────────────────────────────

    /// List the product catalog.
    ///
    /// # Errors
    ///
    /// `SessionExpired` if unauthenticated or the token was rejected.
    pub async fn products(&mut self) -> Result<Vec<Product>> {
        let token = self.require_token()?;
        let result = self.api.list_products(&token).await;
        self.check_expiry(result)
    }

    /// List the user's orders.
    ///
    /// # Errors
    ///
    /// `SessionExpired` if unauthenticated or the token was rejected.
    pub async fn orders(&mut self) -> Result<Vec<Order>> {
        let token = self.require_token()?;
        let result = self.api.list_orders(&token).await;
        self.check_expiry(result)
    }

    /// Fetch the per-user welcome message.
    ///
    /// # Errors
    ///
    /// `SessionExpired` if unauthenticated or the token was rejected.
    pub async fn welcome_message(&mut self) -> Result<String> {
        let token = self.require_token()?;
        let result = self.api.welcome_message(&token).await;
        self.check_expiry(result)
    }

    /// Submit the cart as an order.
    ///
    /// On success the cart is cleared and the profile is refreshed exactly
    /// once (the order changes the loyalty point balance server-side). A
    /// failed refresh does not undo the successful order.
    ///
    /// # Errors
    ///
    /// `OrderSubmissionFailed` for an empty cart or a rejected submission,
    /// `SessionExpired` if unauthenticated or the token was rejected.
    pub async fn place_order(&mut self, cart: &mut Cart) -> Result<Order> {
        if cart.is_empty() {
            return Err(ClientError::OrderSubmissionFailed(
                "cart is empty".to_string(),
            ));
        }

        let token = self.require_token()?;
        let request = CreateOrderRequest {
            items: cart.to_order_items(),
        };

        let result = self.api.create_order(&token, &request).await;
        let order = self.check_expiry(result)?;

        cart.clear();
        if let Err(e) = self.refresh_profile().await {
            tracing::warn!(error = %e, "profile refresh after order failed");
        }
        Ok(order)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────────

    fn dispatch(&mut self, event: SessionEvent) {
        self.session = self.session.apply(event);
    }

    fn require_token(&self) -> Result<String> {
        self.session
            .access_token
            .as_ref()
            .map(|t| t.access_token.clone())
            .ok_or(ClientError::SessionExpired)
    }

    /// Uniform 401 handling: clear credentials, reset state, pass the error on.
    fn check_expiry<T>(&mut self, result: Result<T>) -> Result<T> {
        if matches!(&result, Err(ClientError::SessionExpired)) {
            tracing::warn!("authenticated call returned 401, tearing session down");
            self.force_logout();
        }
        result
    }

    /// Logout that converges even if the cache file cannot be removed.
    fn force_logout(&mut self) {
        if let Err(e) = CredentialCache::clear(&self.credentials_path) {
            tracing::error!(error = %e, "failed to clear credential cache during forced logout");
        }
        self.dispatch(SessionEvent::Logout);
    }

    fn abort_login(&mut self) -> Result<()> {
        CredentialCache::clear(&self.credentials_path)?;
        self.dispatch(SessionEvent::LoginFailure);
        Ok(())
    }

    fn persist(&self, cache: CredentialCache) -> Result<()> {
        cache.save(&self.credentials_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token() -> AccessToken {
        AccessToken {
            access_token: "tok".to_string(),
            token_type: "Bearer".to_string(),
            obtained_at: 0,
        }
    }

    fn profile() -> UserProfile {
        UserProfile {
            user_id: "u-1".to_string(),
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            phone: "555-0100".to_string(),
            point_amount: rust_decimal::Decimal::ZERO,
            account_id: pomelo_core::AccountId::new(1),
        }
    }

    #[test]
    fn test_initial_state_is_anonymous() {
        let session = Session::default();
        assert!(!session.authenticated);
        assert!(session.access_token.is_none());
        assert!(session.user.is_none());
        assert!(!session.loading);
    }

    #[test]
    fn test_login_success_transition() {
        let session = Session::default().apply(SessionEvent::LoginStart);
        assert!(session.loading);

        let session = session.apply(SessionEvent::LoginSuccess {
            token: token(),
            user: profile(),
        });
        assert!(session.authenticated);
        assert!(session.access_token.is_some());
        assert!(session.user.is_some());
        assert!(!session.loading);
    }

    #[test]
    fn test_login_failure_resets_everything() {
        let session = Session::default()
            .apply(SessionEvent::LoginStart)
            .apply(SessionEvent::LoginFailure);
        assert_eq!(session, Session::default());
    }

    #[test]
    fn test_logout_from_authenticated() {
        let session = Session::default()
            .apply(SessionEvent::LoginSuccess {
                token: token(),
                user: profile(),
            })
            .apply(SessionEvent::Logout);
        assert!(!session.authenticated);
        assert!(session.access_token.is_none());
        assert!(session.user.is_none());
    }

    #[test]
    fn test_load_user_success_authenticates_held_token() {
        // Hydrated token without profile: load success completes the session
        let session = Session {
            authenticated: false,
            access_token: Some(token()),
            user: None,
            loading: false,
        };
        let session = session
            .apply(SessionEvent::LoadUserStart)
            .apply(SessionEvent::LoadUserSuccess(profile()));
        assert!(session.authenticated);
        assert!(session.user.is_some());
        assert!(!session.loading);
    }

    #[test]
    fn test_load_user_success_without_token_stays_anonymous() {
        let session = Session::default().apply(SessionEvent::LoadUserSuccess(profile()));
        assert!(!session.authenticated);
    }

    #[test]
    fn test_load_user_failure_only_clears_loading() {
        let session = Session {
            authenticated: true,
            access_token: Some(token()),
            user: Some(profile()),
            loading: true,
        };
        let next = session.apply(SessionEvent::LoadUserFailure);
        assert!(next.authenticated);
        assert!(next.access_token.is_some());
        assert!(!next.loading);
    }

    #[test]
    fn test_hydration_requires_both_token_and_profile() {
        let empty = CredentialCache::default();
        assert!(!Session::hydrated(&empty).authenticated);

        let token_only = CredentialCache {
            access_token: Some(token()),
            user: None,
        };
        let session = Session::hydrated(&token_only);
        assert!(!session.authenticated);
        assert!(session.access_token.is_some());

        let full = CredentialCache {
            access_token: Some(token()),
            user: Some(profile()),
        };
        assert!(Session::hydrated(&full).authenticated);
    }
}

//! Authenticated HTTP client for the user, product, and order services.
//!
//! Every request carries the caller's access token as a bearer credential.
//! A 401 from any endpoint maps to [`ClientError::SessionExpired`],
//! regardless of which call triggered it; the session manager reacts to that
//! variant by tearing the session down. Other error responses surface the
//! backend's embedded `message` field when present.
//!
//! The product catalog is cached in-memory for five minutes and invalidated
//! when an order is placed (stock levels change server-side).

mod types;

pub use types::*;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

/// How long catalog responses stay fresh.
const CATALOG_CACHE_TTL: Duration = Duration::from_secs(300);

/// Cache key for catalog responses.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
enum CacheKey {
    Products,
}

/// Client for the shop's backend services behind the API gateway.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
    catalog: Cache<CacheKey, Vec<Product>>,
}

impl ApiClient {
    /// Create a new API client.
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_http_client(config, reqwest::Client::new())
    }

    /// Create a new API client with a caller-supplied HTTP client.
    #[must_use]
    pub fn with_http_client(config: &ClientConfig, client: reqwest::Client) -> Self {
        Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.api_base_url.clone(),
                catalog: Cache::builder()
                    .max_capacity(8)
                    .time_to_live(CATALOG_CACHE_TTL)
                    .build(),
            }),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Request Plumbing
    // ─────────────────────────────────────────────────────────────────────────

    /// Execute a GET request with the bearer token attached.
    async fn get<T: DeserializeOwned>(&self, access_token: &str, path: &str) -> Result<T> {
        let url = format!("{}{path}", self.inner.base_url);
        let response = self
            .inner
            .client
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await?;

        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    /// Execute a POST request with the bearer token attached.
    async fn post<B: serde::Serialize, T: DeserializeOwned>(
        &self,
        access_token: &str,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = format!("{}{path}", self.inner.base_url);
        let response = self
            .inner
            .client
            .post(&url)
            .bearer_auth(access_token)
            .json(body)
            .send()
            .await?;

        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // User Service
    // ─────────────────────────────────────────────────────────────────────────

    /// Fetch the authenticated user's profile (enveloped response).
    ///
    /// # Errors
    ///
    /// Returns `SessionExpired` on 401, `ProfileFetchFailed` otherwise.
    pub async fn get_profile(&self, access_token: &str) -> Result<UserProfile> {
        let envelope: ApiEnvelope<UserProfile> = self
            .get(access_token, "/user-service/info")
            .await
            .map_err(profile_error)?;
        Ok(envelope.data)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Product Service
    // ─────────────────────────────────────────────────────────────────────────

    /// List the product catalog, served from cache when fresh.
    ///
    /// # Errors
    ///
    /// Returns `SessionExpired` on 401, `Api` otherwise.
    pub async fn list_products(&self, access_token: &str) -> Result<Vec<Product>> {
        if let Some(products) = self.inner.catalog.get(&CacheKey::Products).await {
            return Ok(products);
        }

        let products: Vec<Product> = self.get(access_token, "/product-service/all").await?;
        self.inner
            .catalog
            .insert(CacheKey::Products, products.clone())
            .await;
        Ok(products)
    }

    /// Drop any cached catalog response.
    pub async fn invalidate_catalog(&self) {
        self.inner.catalog.invalidate(&CacheKey::Products).await;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Order Service
    // ─────────────────────────────────────────────────────────────────────────

    /// List the authenticated user's orders, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `SessionExpired` on 401, `Api` otherwise.
    pub async fn list_orders(&self, access_token: &str) -> Result<Vec<Order>> {
        self.get(access_token, "/order-service").await
    }

    /// Submit an order for the given line items.
    ///
    /// The catalog cache is invalidated on success since stock levels change.
    ///
    /// # Errors
    ///
    /// Returns `OrderSubmissionFailed` if `request.items` is empty or the
    /// order service rejects the submission; `SessionExpired` on 401.
    pub async fn create_order(
        &self,
        access_token: &str,
        request: &CreateOrderRequest,
    ) -> Result<Order> {
        if request.items.is_empty() {
            return Err(ClientError::OrderSubmissionFailed(
                "cart is empty".to_string(),
            ));
        }

        let order: Order = self
            .post(access_token, "/order-service", request)
            .await
            .map_err(order_error)?;

        tracing::info!(order_id = %order.id, total = %order.total_amount, "order created");
        self.invalidate_catalog().await;
        Ok(order)
    }

    /// Fetch the per-user welcome message.
    ///
    /// # Errors
    ///
    /// Returns `SessionExpired` on 401, `Api` otherwise.
    pub async fn welcome_message(&self, access_token: &str) -> Result<String> {
        let url = format!("{}/order-service/welcome", self.inner.base_url);
        let response = self
            .inner
            .client
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await?;

        let response = check_status(response).await?;
        Ok(response.text().await?)
    }
}

/// Map a non-success response to the uniform error contract.
///
/// 401 always becomes `SessionExpired`; anything else surfaces the body's
/// JSON `message` field when present, or the raw body otherwise.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(ClientError::SessionExpired);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Api {
        status: status.as_u16(),
        message: extract_message(&body),
    })
}

/// Pull the `message` field out of a JSON error body, if there is one.
fn extract_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or_else(|| body.to_string())
}

/// Re-tag profile fetch failures, preserving session expiry.
fn profile_error(err: ClientError) -> ClientError {
    match err {
        ClientError::SessionExpired => ClientError::SessionExpired,
        other => ClientError::ProfileFetchFailed(other.to_string()),
    }
}

/// Re-tag order submission failures, preserving session expiry.
fn order_error(err: ClientError) -> ClientError {
    match err {
        ClientError::SessionExpired => ClientError::SessionExpired,
        other => ClientError::OrderSubmissionFailed(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_message_prefers_json_field() {
        assert_eq!(
            extract_message(r#"{"message": "insufficient stock", "code": 409}"#),
            "insufficient stock"
        );
        assert_eq!(extract_message("plain body"), "plain body");
        assert_eq!(extract_message(r#"{"error": "no message field"}"#), r#"{"error": "no message field"}"#);
    }

    #[test]
    fn test_profile_error_preserves_session_expiry() {
        assert!(matches!(
            profile_error(ClientError::SessionExpired),
            ClientError::SessionExpired
        ));
        assert!(matches!(
            profile_error(ClientError::Api {
                status: 500,
                message: "boom".to_string()
            }),
            ClientError::ProfileFetchFailed(_)
        ));
    }
}

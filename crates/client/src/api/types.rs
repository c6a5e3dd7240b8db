//! Wire types for the user, product, and order services.
//!
//! Field names on the wire are camelCase, matching the backend DTOs.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use pomelo_core::{AccountId, OrderId, OrderStatus, ProductId};

/// Response envelope used by the user service: `{ message, data }`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    /// Human-readable status message.
    pub message: String,
    /// The payload.
    pub data: T,
}

/// The authenticated user's profile, including the loyalty point balance.
///
/// Replaced wholesale on each successful fetch; never patched field-by-field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Backend-issued user identifier.
    #[serde(rename = "userId")]
    pub user_id: String,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Phone number.
    pub phone: String,
    /// Current loyalty point balance; changes server-side when orders settle.
    #[serde(rename = "pointAmount", with = "rust_decimal::serde::float")]
    pub point_amount: Decimal,
    /// Linked account identifier.
    #[serde(rename = "accountId")]
    pub account_id: AccountId,
}

/// A product from the catalog service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Product identifier.
    #[serde(rename = "productId")]
    pub product_id: ProductId,
    /// Display name.
    #[serde(rename = "productName")]
    pub product_name: String,
    /// Price per unit.
    #[serde(rename = "unitPrice", with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    /// Units currently in stock; the purchasable ceiling.
    #[serde(rename = "productStock")]
    pub product_stock: u32,
}

impl Product {
    /// Whether the product can currently be purchased at all.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.product_stock > 0
    }
}

/// An order as reported by the order service.
#[derive(Debug, Clone, Deserialize)]
pub struct Order {
    /// Order identifier.
    pub id: OrderId,
    /// Lifecycle status.
    pub status: OrderStatus,
    /// Total charged for the order.
    #[serde(rename = "totalAmount", with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    /// When the order was created.
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Line items; the order service omits them on some list endpoints.
    #[serde(default)]
    pub items: Vec<OrderItemInput>,
}

/// A line item submitted with (or echoed back on) an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItemInput {
    /// Product being ordered.
    #[serde(rename = "productId")]
    pub product_id: ProductId,
    /// Number of units.
    #[serde(rename = "productQuantity")]
    pub product_quantity: u32,
}

/// Request body for creating an order.
#[derive(Debug, Clone, Serialize)]
pub struct CreateOrderRequest {
    /// Line items to order.
    pub items: Vec<OrderItemInput>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_profile_wire_names() {
        let json = r#"{
            "userId": "u-1",
            "name": "Alice",
            "email": "alice@example.com",
            "phone": "555-0100",
            "pointAmount": 120.5,
            "accountId": 7
        }"#;
        let profile: UserProfile = serde_json::from_str(json).expect("valid profile");
        assert_eq!(profile.user_id, "u-1");
        assert_eq!(profile.point_amount, Decimal::new(1205, 1));
        assert_eq!(profile.account_id, AccountId::new(7));
    }

    #[test]
    fn test_product_wire_names() {
        let json = r#"{"productId": 3, "productName": "Pomelo", "unitPrice": 10.0, "productStock": 5}"#;
        let product: Product = serde_json::from_str(json).expect("valid product");
        assert_eq!(product.product_id, ProductId::new(3));
        assert_eq!(product.unit_price, Decimal::new(10, 0));
        assert!(product.in_stock());
    }

    #[test]
    fn test_order_without_items_or_timestamp() {
        let json = r#"{"id": 11, "status": "PENDING", "totalAmount": 25.0}"#;
        let order: Order = serde_json::from_str(json).expect("valid order");
        assert_eq!(order.id, OrderId::new(11));
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.items.is_empty());
        assert!(order.created_at.is_none());
    }

    #[test]
    fn test_create_order_request_wire_names() {
        let request = CreateOrderRequest {
            items: vec![OrderItemInput {
                product_id: ProductId::new(1),
                product_quantity: 2,
            }],
        };
        let json = serde_json::to_value(&request).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({"items": [{"productId": 1, "productQuantity": 2}]})
        );
    }
}

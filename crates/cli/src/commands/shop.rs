//! Catalog, order, and welcome commands.

use pomelo_client::cart::{AddOutcome, Cart, QuantityChange};
use pomelo_client::session::SessionManager;
use pomelo_core::{ProductId, display_amount};

use super::CommandError;

/// List the product catalog.
pub async fn products(manager: &mut SessionManager) -> Result<(), CommandError> {
    manager.ensure_initialized().await?;
    let products = manager.products().await?;

    tracing::info!("{} product(s):", products.len());
    for product in products {
        tracing::info!(
            "  [{}] {} - {} ({} in stock)",
            product.product_id,
            product.product_name,
            display_amount(product.unit_price),
            product.product_stock
        );
    }
    Ok(())
}

/// List the user's orders.
pub async fn orders(manager: &mut SessionManager) -> Result<(), CommandError> {
    manager.ensure_initialized().await?;
    let orders = manager.orders().await?;

    tracing::info!("{} order(s):", orders.len());
    for order in orders {
        let created = order
            .created_at
            .map_or_else(|| "-".to_string(), |t| t.to_rfc3339());
        tracing::info!(
            "  #{} {} {} ({created})",
            order.id,
            order.status,
            display_amount(order.total_amount)
        );
    }
    Ok(())
}

/// Place an order for `PRODUCT_ID:QUANTITY` pairs.
pub async fn buy(manager: &mut SessionManager, items: &[String]) -> Result<(), CommandError> {
    manager.ensure_initialized().await?;
    let catalog = manager.products().await?;

    let mut cart = Cart::new();
    for spec in items {
        let (product_id, quantity) = parse_item_spec(spec)?;
        let product = catalog
            .iter()
            .find(|p| p.product_id == product_id)
            .ok_or_else(|| CommandError::UnknownProduct(product_id.to_string()))?;

        match cart.add_or_increment(product) {
            AddOutcome::OutOfStock => {
                tracing::warn!("{} is out of stock, skipping", product.product_name);
                continue;
            }
            AddOutcome::Added | AddOutcome::Incremented | AddOutcome::AtCapacity => {}
        }
        for _ in 1..quantity {
            if cart.increment(product_id) == QuantityChange::AtCapacity {
                tracing::warn!(
                    "{} capped at {} (stock limit)",
                    product.product_name,
                    product.product_stock
                );
                break;
            }
        }
    }

    tracing::info!("Cart total: {}", display_amount(cart.total()));
    let order = manager.place_order(&mut cart).await?;
    tracing::info!(
        "Order #{} placed: {} ({})",
        order.id,
        display_amount(order.total_amount),
        order.status
    );

    if let Some(user) = manager.user() {
        tracing::info!("Point balance: {}", user.point_amount);
    }
    Ok(())
}

/// Fetch the per-user welcome message.
pub async fn welcome(manager: &mut SessionManager) -> Result<(), CommandError> {
    manager.ensure_initialized().await?;
    let message = manager.welcome_message().await?;
    tracing::info!("{message}");
    Ok(())
}

/// Parse a `PRODUCT_ID:QUANTITY` argument. Quantity must be at least 1.
fn parse_item_spec(spec: &str) -> Result<(ProductId, u32), CommandError> {
    let invalid = || CommandError::InvalidItemSpec(spec.to_string());

    let (id, quantity) = spec.split_once(':').ok_or_else(invalid)?;
    let id: i64 = id.trim().parse().map_err(|_| invalid())?;
    let quantity: u32 = quantity.trim().parse().map_err(|_| invalid())?;
    if quantity == 0 {
        return Err(invalid());
    }
    Ok((ProductId::new(id), quantity))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_item_spec() {
        assert_eq!(parse_item_spec("3:2").expect("valid"), (ProductId::new(3), 2));
        assert_eq!(
            parse_item_spec(" 7 : 1 ").expect("valid"),
            (ProductId::new(7), 1)
        );
    }

    #[test]
    fn test_parse_item_spec_rejects_malformed() {
        for bad in ["3", "3:", ":2", "a:b", "3:0", "3:-1"] {
            assert!(
                matches!(parse_item_spec(bad), Err(CommandError::InvalidItemSpec(_))),
                "should reject {bad}"
            );
        }
    }
}

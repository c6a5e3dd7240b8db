//! In-memory shopping cart.
//!
//! The cart is a pure value: every operation is synchronous, touches nothing
//! but the cart itself, and is driven by a single owner (the UI event loop in
//! the original system, the CLI here). Quantities are bounded by the stock
//! level snapshotted when the line was added; at most one line exists per
//! product, and lines keep their first-added order.
//!
//! Totals accumulate in [`Decimal`], not floats.

use rust_decimal::Decimal;

use pomelo_core::ProductId;

use crate::api::{OrderItemInput, Product};

/// One selected product with its quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    /// Product identifier.
    pub product_id: ProductId,
    /// Display name, snapshotted at add-time.
    pub product_name: String,
    /// Price per unit, snapshotted at add-time.
    pub unit_price: Decimal,
    /// Stock level at add-time; the quantity ceiling for this line.
    pub stock_ceiling: u32,
    /// Units selected. Always >= 1; a line that would reach 0 is removed.
    pub quantity: u32,
}

impl CartLine {
    /// Price times quantity for this line.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Result of adding a product to the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new line was created with quantity 1.
    Added,
    /// An existing line's quantity was incremented.
    Incremented,
    /// The line is already at its stock ceiling; nothing changed.
    AtCapacity,
    /// The product has no stock; nothing was added.
    OutOfStock,
}

/// Result of changing an existing line's quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// The quantity was updated.
    Updated,
    /// The line is at its stock ceiling; nothing changed.
    AtCapacity,
    /// The quantity reached 0 and the line was removed.
    Removed,
    /// No line exists for that product; nothing changed.
    NotInCart,
}

/// An insertion-ordered set of cart lines, unique per product.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of lines (not units).
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// The lines in first-added order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Remove all lines.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Add a product, or bump its quantity if already present.
    ///
    /// Out-of-stock products are rejected before any line is created, and an
    /// existing line stops at its stock ceiling without erroring.
    pub fn add_or_increment(&mut self, product: &Product) -> AddOutcome {
        if let Some(line) = self.line_mut(product.product_id) {
            if line.quantity >= line.stock_ceiling {
                return AddOutcome::AtCapacity;
            }
            line.quantity += 1;
            return AddOutcome::Incremented;
        }

        if !product.in_stock() {
            return AddOutcome::OutOfStock;
        }

        self.lines.push(CartLine {
            product_id: product.product_id,
            product_name: product.product_name.clone(),
            unit_price: product.unit_price,
            stock_ceiling: product.product_stock,
            quantity: 1,
        });
        AddOutcome::Added
    }

    /// Increment an existing line's quantity by 1, bounded by its ceiling.
    pub fn increment(&mut self, product_id: ProductId) -> QuantityChange {
        match self.line_mut(product_id) {
            None => QuantityChange::NotInCart,
            Some(line) if line.quantity >= line.stock_ceiling => QuantityChange::AtCapacity,
            Some(line) => {
                line.quantity += 1;
                QuantityChange::Updated
            }
        }
    }

    /// Decrement an existing line's quantity by 1, removing it at 0.
    pub fn decrement(&mut self, product_id: ProductId) -> QuantityChange {
        let Some(index) = self.lines.iter().position(|l| l.product_id == product_id) else {
            return QuantityChange::NotInCart;
        };

        let remove = self
            .lines
            .get_mut(index)
            .map(|line| {
                if line.quantity > 1 {
                    line.quantity -= 1;
                    false
                } else {
                    true
                }
            })
            .unwrap_or(false);

        if remove {
            self.lines.remove(index);
            QuantityChange::Removed
        } else {
            QuantityChange::Updated
        }
    }

    /// Remove a line unconditionally. Returns whether a line was removed.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        self.lines.len() < before
    }

    /// Sum of `unit_price * quantity` across all lines.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Map the lines to the order service's line-item shape.
    #[must_use]
    pub fn to_order_items(&self) -> Vec<OrderItemInput> {
        self.lines
            .iter()
            .map(|line| OrderItemInput {
                product_id: line.product_id,
                product_quantity: line.quantity,
            })
            .collect()
    }

    fn line_mut(&mut self, product_id: ProductId) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|l| l.product_id == product_id)
    }
}

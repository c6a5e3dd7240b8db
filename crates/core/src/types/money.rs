//! Decimal money helpers.
//!
//! Prices and totals use [`rust_decimal::Decimal`] throughout. The backend
//! sends plain JSON numbers; decimal accumulation keeps cart totals exact
//! where repeated `f64` addition would drift.

use rust_decimal::Decimal;

/// Format a monetary amount for display, rounded to two decimal places.
///
/// # Example
///
/// ```rust
/// use rust_decimal::Decimal;
/// use pomelo_core::display_amount;
///
/// let amount = Decimal::new(1999, 2); // 19.99
/// assert_eq!(display_amount(amount), "$19.99");
/// ```
#[must_use]
pub fn display_amount(amount: Decimal) -> String {
    format!("${:.2}", amount.round_dp(2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_amount_rounds_to_two_places() {
        assert_eq!(display_amount(Decimal::new(25, 0)), "$25.00");
        assert_eq!(display_amount(Decimal::new(10_005, 3)), "$10.01");
        // Banker's rounding is the Decimal default; 10.004 rounds down.
        assert_eq!(display_amount(Decimal::new(10_004, 3)), "$10.00");
    }
}

//! Checkout totals.

use crate::types::Price;

use super::Cart;

/// Flat shipping fee applied to every non-empty order, in cents.
pub const SHIPPING_FLAT_RATE_CENTS: u32 = 500;

/// Subtotal, shipping and grand total for an order.
///
/// An empty cart has no shipping charge, so all three amounts are zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderSummary {
    pub subtotal: Price,
    pub shipping: Price,
    pub total: Price,
}

impl OrderSummary {
    /// Compute the summary for a cart.
    #[must_use]
    pub fn for_cart(cart: &Cart) -> Self {
        if cart.is_empty() {
            return Self::zero();
        }
        let subtotal = cart.subtotal();
        let shipping = Price::from_cents(SHIPPING_FLAT_RATE_CENTS);
        Self {
            subtotal,
            shipping,
            total: subtotal + shipping,
        }
    }

    #[must_use]
    pub const fn zero() -> Self {
        Self {
            subtotal: Price::ZERO,
            shipping: Price::ZERO,
            total: Price::ZERO,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{Product, ProductId};

    #[test]
    fn test_summary_with_items() {
        let mut cart = Cart::new();
        for (id, price) in [("a", "10.00"), ("a", "10.00"), ("b", "5.50")] {
            cart.add_item(Product {
                id: ProductId::from(id),
                name: id.to_string(),
                price: Price::parse(price).unwrap(),
                image: None,
            });
        }

        let summary = cart.summary();
        assert_eq!(summary.subtotal.display(), "$25.50");
        assert_eq!(summary.shipping.display(), "$5.00");
        assert_eq!(summary.total.display(), "$30.50");
    }

    #[test]
    fn test_summary_empty_is_zero() {
        assert_eq!(Cart::new().summary(), OrderSummary::zero());
    }
}

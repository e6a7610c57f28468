//! Checkout summary page.
//!
//! Lists every line with its line total, then subtotal, the flat shipping
//! fee and the grand total. Payment is out of scope; the page ends here.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;
use cartstore_core::{Cart, LineItem};
use tracing::instrument;

use crate::middleware::SessionCart;

/// Order line display data for templates.
#[derive(Clone)]
pub struct OrderItemView {
    pub name: String,
    pub image: String,
    pub quantity: u32,
    pub line_total: String,
}

/// Order summary display data for templates.
#[derive(Clone)]
pub struct CheckoutView {
    pub items: Vec<OrderItemView>,
    pub subtotal: String,
    pub shipping: String,
    pub total: String,
}

impl From<&LineItem> for OrderItemView {
    fn from(item: &LineItem) -> Self {
        Self {
            name: item.name.clone(),
            image: item.image.clone(),
            quantity: item.quantity(),
            line_total: item.line_total().display(),
        }
    }
}

impl From<&Cart> for CheckoutView {
    fn from(cart: &Cart) -> Self {
        let summary = cart.summary();
        Self {
            items: cart.items().iter().map(OrderItemView::from).collect(),
            subtotal: summary.subtotal.display(),
            shipping: summary.shipping.display(),
            total: summary.total.display(),
        }
    }
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutShowTemplate {
    pub summary: CheckoutView,
    pub count: u64,
}

/// Order summary fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/order_summary.html")]
pub struct OrderSummaryTemplate {
    pub summary: CheckoutView,
}

/// Display the checkout summary.
#[instrument(skip(cart))]
pub async fn show(cart: SessionCart) -> impl IntoResponse {
    let cart = cart.cart();
    CheckoutShowTemplate {
        summary: CheckoutView::from(cart),
        count: cart.item_count(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use cartstore_core::{Price, Product, ProductId};

    use super::*;

    fn cart_with(lines: &[(&str, &str, u32)]) -> Cart {
        let mut cart = Cart::new();
        for (id, price, qty) in lines {
            for _ in 0..*qty {
                cart.add_item(Product {
                    id: ProductId::from(*id),
                    name: id.to_uppercase(),
                    price: Price::parse(price).unwrap(),
                    image: None,
                });
            }
        }
        cart
    }

    #[test]
    fn test_checkout_totals() {
        let view = CheckoutView::from(&cart_with(&[("a", "10.00", 2), ("b", "5.50", 1)]));
        assert_eq!(view.subtotal, "$25.50");
        assert_eq!(view.shipping, "$5.00");
        assert_eq!(view.total, "$30.50");
        assert_eq!(view.items[0].line_total, "$20.00");
    }

    #[test]
    fn test_empty_checkout_is_zeroed() {
        let html = OrderSummaryTemplate {
            summary: CheckoutView::from(&Cart::new()),
        }
        .render()
        .unwrap();

        assert!(html.contains("Your cart is empty"));
        assert!(html.contains("<dd id=\"subtotal\">$0.00</dd>"));
        assert!(html.contains("<dd id=\"total\">$0.00</dd>"));
    }

    #[test]
    fn test_summary_lists_quantities() {
        let html = CheckoutShowTemplate {
            summary: CheckoutView::from(&cart_with(&[("mug", "14", 3)])),
            count: 3,
        }
        .render()
        .unwrap();

        assert!(html.contains("Qty: 3"));
        assert!(html.contains("<dd id=\"shipping\">$5.00</dd>"));
        assert!(html.contains("<dd id=\"total\">$47.00</dd>"));
    }
}

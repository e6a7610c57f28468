//! Which page view is being shown.

use serde::{Deserialize, Serialize};

/// A page that renders cart data.
///
/// Resolved from a URL path: anything containing `checkout` is the checkout
/// summary, anything else containing `cart` is the cart page, and every
/// other path is the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    #[default]
    Catalog,
    Cart,
    Checkout,
}

impl View {
    /// Resolve the view for a path or full URL.
    ///
    /// ```
    /// use cartstore_core::View;
    ///
    /// assert_eq!(View::from_path("/cart"), View::Cart);
    /// assert_eq!(View::from_path("https://shop.test/checkout?step=1"), View::Checkout);
    /// assert_eq!(View::from_path("/products/mug"), View::Catalog);
    /// ```
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        // Drop scheme and host so a domain like `cart.shop` does not match.
        let path = match path.split_once("://") {
            Some((_, rest)) => rest.find('/').and_then(|i| rest.get(i..)).unwrap_or(""),
            None => path,
        };
        let path = path.to_ascii_lowercase();
        if path.contains("checkout") {
            Self::Checkout
        } else if path.contains("cart") {
            Self::Cart
        } else {
            Self::Catalog
        }
    }

    /// Canonical path of the page for this view.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Catalog => "/",
            Self::Cart => "/cart",
            Self::Checkout => "/checkout",
        }
    }
}

//! The cart model and its mutation rules.
//!
//! A [`Cart`] is an ordered list of [`LineItem`]s with at most one line per
//! product id. Adding a product that is already present bumps its quantity
//! instead of appending, and a quantity below one removes the line.
//!
//! The methods here only touch memory. Persisting after each change is the
//! job of [`CartStore`](crate::CartStore).

mod summary;

pub use summary::{OrderSummary, SHIPPING_FLAT_RATE_CENTS};

use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{Price, ProductId};

/// The payload carried by an add-to-cart control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    /// Image URL. `None` renders without an image.
    pub image: Option<String>,
}

/// One product entry in the cart with its quantity.
///
/// `quantity` is always at least 1; use [`Cart::set_quantity`] to change it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub image: String,
    #[serde(
        default = "default_quantity",
        deserialize_with = "deserialize_quantity"
    )]
    quantity: u32,
}

const fn default_quantity() -> u32 {
    1
}

/// Stored quantities outside `1..=u32::MAX` are clamped rather than rejected,
/// so one odd line does not throw away the whole cart.
fn deserialize_quantity<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<i64>::deserialize(deserializer)?;
    Ok(raw.map_or(1, clamp_quantity))
}

fn clamp_quantity(quantity: i64) -> u32 {
    if quantity < 1 {
        1
    } else {
        u32::try_from(quantity).unwrap_or(u32::MAX)
    }
}

impl LineItem {
    fn from_product(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            price: product.price,
            image: product.image.unwrap_or_default(),
            quantity: 1,
        }
    }

    /// Number of units of this product in the cart.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// `price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// Whether the cart has anything in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartState {
    Empty,
    NonEmpty,
}

/// Outcome of [`Cart::set_quantity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// The line now has the requested quantity.
    Updated,
    /// The requested quantity was below one and the line was dropped.
    Removed,
    /// No line with that id exists; nothing changed.
    Missing,
}

/// Parse a quantity typed into a quantity field.
///
/// Only whole integers are accepted. Anything else yields `0`, which
/// [`Cart::set_quantity`] treats as a removal.
///
/// ```
/// use cartstore_core::parse_quantity;
///
/// assert_eq!(parse_quantity(" 3 "), 3);
/// assert_eq!(parse_quantity("-2"), -2);
/// assert_eq!(parse_quantity("two"), 0);
/// assert_eq!(parse_quantity("1.5"), 0);
/// ```
#[must_use]
pub fn parse_quantity(input: &str) -> i64 {
    input.trim().parse::<i64>().unwrap_or(0)
}

/// The ordered collection of line items for one visitor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<LineItem>", into = "Vec<LineItem>")]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Find the line for a product.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&LineItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn state(&self) -> CartState {
        if self.is_empty() {
            CartState::Empty
        } else {
            CartState::NonEmpty
        }
    }

    /// Total units across all lines, shown on the count badge.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// `Σ price × quantity`.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items.iter().map(LineItem::line_total).sum()
    }

    /// Subtotal, flat shipping and total for the checkout page.
    #[must_use]
    pub fn summary(&self) -> OrderSummary {
        OrderSummary::for_cart(self)
    }

    /// Add one unit of `product`.
    ///
    /// If a line with the same id exists its quantity goes up by one and the
    /// stored name, price and image are kept. Otherwise a new line with
    /// quantity 1 is appended. Returns the line's new quantity.
    pub fn add_item(&mut self, product: Product) -> u32 {
        if let Some(existing) = self.items.iter_mut().find(|item| item.id == product.id) {
            existing.quantity = existing.quantity.saturating_add(1);
            return existing.quantity;
        }
        self.items.push(LineItem::from_product(product));
        1
    }

    /// Set the quantity of a line, removing it when `quantity < 1`.
    pub fn set_quantity(&mut self, id: &ProductId, quantity: i64) -> QuantityChange {
        if quantity < 1 {
            return if self.remove_item(id) {
                QuantityChange::Removed
            } else {
                QuantityChange::Missing
            };
        }
        match self.items.iter_mut().find(|item| &item.id == id) {
            Some(item) => {
                item.quantity = clamp_quantity(quantity);
                QuantityChange::Updated
            }
            None => QuantityChange::Missing,
        }
    }

    /// Drop the line for `id`. Returns whether a line was removed.
    pub fn remove_item(&mut self, id: &ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| &item.id != id);
        self.items.len() != before
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl From<Vec<LineItem>> for Cart {
    /// Build a cart from stored lines, merging duplicate ids into the first
    /// occurrence by summing quantities.
    fn from(lines: Vec<LineItem>) -> Self {
        let mut items: Vec<LineItem> = Vec::with_capacity(lines.len());
        for line in lines {
            match items.iter_mut().find(|item| item.id == line.id) {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(line.quantity);
                }
                None => items.push(line),
            }
        }
        Self { items }
    }
}

impl From<Cart> for Vec<LineItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

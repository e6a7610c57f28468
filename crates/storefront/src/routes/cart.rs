//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads
//! and fall back to plain form posts with a redirect. The cart itself lives
//! in the visitor's session (see [`SessionCart`]).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use cartstore_core::{
    Cart, CheckoutError, LineItem, Price, Product, ProductId, View, parse_quantity,
};
use serde::Deserialize;
use tracing::instrument;

use super::checkout::{CheckoutView, OrderSummaryTemplate};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::{CART_UPDATED_EVENT, HX_TRIGGER, Htmx, SessionCart};
use crate::state::AppState;

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub id: String,
    pub name: String,
    pub image: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total: String,
    pub item_count: u64,
}

impl CartView {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl From<&LineItem> for CartItemView {
    fn from(item: &LineItem) -> Self {
        Self {
            id: item.id.to_string(),
            name: item.name.clone(),
            image: item.image.clone(),
            quantity: item.quantity(),
            price: item.price.display(),
            line_price: item.line_total().display(),
        }
    }
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items().iter().map(CartItemView::from).collect(),
            total: cart.subtotal().display(),
            item_count: cart.item_count(),
        }
    }
}

/// Add to cart form data, posted by an add-to-cart control.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub id: String,
    pub name: String,
    pub price: String,
    pub image: Option<String>,
}

impl AddToCartForm {
    fn into_product(self) -> Result<Product> {
        let id = ProductId::parse(&self.id).map_err(|e| AppError::BadRequest(e.to_string()))?;
        let price = Price::parse(&self.price).map_err(|e| AppError::BadRequest(e.to_string()))?;
        let name = self.name.trim();
        Ok(Product {
            name: if name.is_empty() {
                id.to_string()
            } else {
                name.to_string()
            },
            id,
            price,
            image: self.image.filter(|image| !image.trim().is_empty()),
        })
    }
}

/// Update cart form data.
///
/// `quantity` is kept as raw text: anything that is not an integer of at
/// least one removes the line.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub id: String,
    #[serde(default)]
    pub quantity: String,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub id: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
    pub count: u64,
    pub notice: Option<String>,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u64,
}

/// Respond to a cart change by re-rendering the page it came from.
///
/// HTMX requests get the fragment for that page plus a `cart-updated`
/// trigger for the badges; plain posts are redirected back to it.
fn cart_updated(htmx: Htmx, fallback: View, cart: &Cart) -> Response {
    let view = htmx.active_view(fallback);
    if !htmx.is_request {
        return Redirect::to(view.path()).into_response();
    }

    let trigger = AppendHeaders([(HX_TRIGGER, CART_UPDATED_EVENT)]);
    match view {
        View::Cart => (
            trigger,
            CartItemsTemplate {
                cart: CartView::from(cart),
            },
        )
            .into_response(),
        View::Checkout => (
            trigger,
            OrderSummaryTemplate {
                summary: CheckoutView::from(cart),
            },
        )
            .into_response(),
        View::Catalog => (
            trigger,
            CartCountTemplate {
                count: cart.item_count(),
            },
        )
            .into_response(),
    }
}

/// Display cart page.
#[instrument(skip(cart))]
pub async fn show(cart: SessionCart) -> impl IntoResponse {
    let cart = cart.cart();
    CartShowTemplate {
        cart: CartView::from(cart),
        count: cart.item_count(),
        notice: None,
    }
}

/// Add item to cart.
///
/// Merges into an existing line for the same product. HTMX callers get the
/// new badge; plain posts are sent back to the page they came from.
#[instrument(skip(cart, htmx))]
pub async fn add(
    htmx: Htmx,
    mut cart: SessionCart,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let product = form.into_product()?;
    add_breadcrumb("cart", "Added item", Some(&[("product_id", product.id.as_str())]));

    let count = cart.add_item(product)?;
    cart.commit().await?;

    if !htmx.is_request {
        return Ok(Redirect::to(htmx.active_view(View::Catalog).path()).into_response());
    }
    Ok((
        AppendHeaders([(HX_TRIGGER, CART_UPDATED_EVENT)]),
        CartCountTemplate { count },
    )
        .into_response())
}

/// Update cart item quantity. Quantities below one remove the line.
#[instrument(skip(cart, htmx))]
pub async fn update(
    htmx: Htmx,
    mut cart: SessionCart,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let id = ProductId::parse(&form.id).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let quantity = parse_quantity(&form.quantity);
    add_breadcrumb("cart", "Changed quantity", Some(&[("product_id", id.as_str())]));

    cart.set_quantity(&id, quantity)?;
    let cart = cart.commit().await?;

    Ok(cart_updated(htmx, View::Cart, &cart))
}

/// Remove item from cart. Removing an item that is not there is a no-op.
#[instrument(skip(cart, htmx))]
pub async fn remove(
    htmx: Htmx,
    mut cart: SessionCart,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    let id = ProductId::parse(&form.id).map_err(|e| AppError::BadRequest(e.to_string()))?;
    add_breadcrumb("cart", "Removed item", Some(&[("product_id", id.as_str())]));

    cart.remove_item(&id)?;
    let cart = cart.commit().await?;

    Ok(cart_updated(htmx, View::Cart, &cart))
}

/// Get cart count badge (HTMX).
#[instrument(skip(cart))]
pub async fn count(cart: SessionCart) -> impl IntoResponse {
    CartCountTemplate {
        count: cart.cart().item_count(),
    }
}

/// Save the cart and go to the checkout page.
///
/// An empty cart stays on the cart page with a blocking notice and nothing
/// is written.
#[instrument(skip(state, cart))]
pub async fn checkout(State(state): State<AppState>, mut cart: SessionCart) -> Result<Response> {
    match cart.checkout() {
        Ok(()) => {
            cart.commit().await?;
            Ok(Redirect::to(&state.config().checkout_path).into_response())
        }
        Err(err @ CheckoutError::EmptyCart) => {
            tracing::info!("Checkout attempted with an empty cart");
            let cart = cart.cart();
            Ok(CartShowTemplate {
                cart: CartView::from(cart),
                count: cart.item_count(),
                notice: Some(err.to_string()),
            }
            .into_response())
        }
        Err(CheckoutError::Storage(e)) => Err(e.into()),
    }
}

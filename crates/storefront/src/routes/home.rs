//! Home page: the product catalog with add-to-cart controls.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::catalog::CatalogProduct;
use crate::middleware::SessionCart;
use crate::state::AppState;

/// Product card display data for templates.
#[derive(Clone)]
pub struct ProductCardView {
    pub id: String,
    pub name: String,
    /// Formatted price, e.g. `$14.00`.
    pub price: String,
    /// Raw decimal amount posted back by the add-to-cart form.
    pub price_value: String,
    pub image: String,
}

impl From<&CatalogProduct> for ProductCardView {
    fn from(product: &CatalogProduct) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            price: product.price.display(),
            price_value: product.price.amount().to_string(),
            image: product.image.clone(),
        }
    }
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub products: Vec<ProductCardView>,
    pub count: u64,
}

/// Display the catalog.
#[instrument(skip(state, cart))]
pub async fn home(State(state): State<AppState>, cart: SessionCart) -> impl IntoResponse {
    HomeTemplate {
        products: state
            .catalog()
            .products()
            .iter()
            .map(ProductCardView::from)
            .collect(),
        count: cart.cart().item_count(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use cartstore_core::{Price, ProductId};

    use super::*;

    #[test]
    fn test_product_card_renders_add_control() {
        let product = CatalogProduct {
            id: ProductId::from("mug"),
            name: "Stoneware Mug".to_string(),
            price: Price::parse("14.00").unwrap(),
            image: "/static/img/mug.jpg".to_string(),
        };
        let html = HomeTemplate {
            products: vec![ProductCardView::from(&product)],
            count: 0,
        }
        .render()
        .unwrap();

        assert!(html.contains("class=\"add-to-cart-btn\""));
        assert!(html.contains("data-product-id=\"mug\""));
        assert!(html.contains("name=\"price\" value=\"14\""));
        assert!(html.contains("$14.00"));
    }
}

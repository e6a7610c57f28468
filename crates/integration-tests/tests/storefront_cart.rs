//! Integration tests for the cart and checkout flow.
//!
//! Each test drives the storefront router in-process with an in-memory
//! session store; see `cartstore_integration_tests::TestClient`.

use axum::http::StatusCode;
use cartstore_integration_tests::{FlakyStore, Origin, TestClient, sample_catalog};
use cartstore_storefront::catalog::Catalog;

fn client() -> TestClient {
    TestClient::new(Catalog::default())
}

// ============================================================================
// Add to cart
// ============================================================================

#[tokio::test]
async fn test_add_returns_badge_and_trigger() {
    let mut client = client();

    let resp = client.add("mug", "Mug", "14.00").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.header("hx-trigger"), Some("cart-updated"));
    assert!(resp.body.contains(">1<"));

    let resp = client.add("mug", "Mug", "14.00").await;
    assert!(resp.body.contains(">2<"));

    let resp = client.get("/cart/count").await;
    assert!(resp.body.contains(">2<"));
}

#[tokio::test]
async fn test_add_merges_lines_on_cart_page() {
    let mut client = client();
    client.add("mug", "Mug", "10.00").await;
    client.add("tote", "Tote", "5.50").await;
    client.add("mug", "Mug", "10.00").await;

    let resp = client.get("/cart").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body.matches("class=\"quantity-input\"").count(), 2);
    assert!(resp.body.contains("value=\"2\""));
    assert!(resp.body.contains("<span id=\"cart-total\">$25.50</span>"));
}

#[tokio::test]
async fn test_plain_add_redirects_back() {
    let mut client = client();
    let resp = client
        .post_form("/cart/add", "id=mug&name=Mug&price=3", Origin::Plain)
        .await;
    assert_eq!(resp.status, StatusCode::SEE_OTHER);
    assert_eq!(resp.header("location"), Some("/"));
}

#[tokio::test]
async fn test_add_rejects_bad_price() {
    let mut client = client();
    for price in ["free", "-2", "79228162514264337593543950335", "1000000000.01"] {
        let form = format!("id=mug&name=Mug&price={price}");
        let resp = client.post_form("/cart/add", &form, Origin::Htmx("/")).await;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    }
    assert!(client.get("/cart/count").await.body.contains(">0<"));
}

#[tokio::test]
async fn test_largest_price_and_quantity_still_render() {
    let mut client = client();
    let resp = client.add("gold", "Gold", "1000000000").await;
    assert_eq!(resp.status, StatusCode::OK);

    let resp = client
        .post_form("/cart/update", "id=gold&quantity=1000000000", Origin::Htmx("/cart"))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("$1000000000000000000.00"));

    let resp = client.get("/checkout").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("<dd id=\"total\">$1000000000000000005.00</dd>"));
}

// ============================================================================
// Quantity updates and removal
// ============================================================================

#[tokio::test]
async fn test_update_sets_quantity() {
    let mut client = client();
    client.add("mug", "Mug", "10.00").await;

    let resp = client
        .post_form("/cart/update", "id=mug&quantity=4", Origin::Htmx("/cart"))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.header("hx-trigger"), Some("cart-updated"));
    assert!(resp.body.contains("id=\"cart-section\""));
    assert!(resp.body.contains("<span id=\"cart-total\">$40.00</span>"));
}

#[tokio::test]
async fn test_update_below_one_removes() {
    for quantity in ["0", "-3", "abc", ""] {
        let mut client = client();
        client.add("mug", "Mug", "10.00").await;

        let form = format!("id=mug&quantity={quantity}");
        let resp = client
            .post_form("/cart/update", &form, Origin::Htmx("/cart"))
            .await;
        assert_eq!(resp.status, StatusCode::OK);
        assert!(
            resp.body
                .contains("id=\"cart-checkout-section\" style=\"display: none\""),
            "quantity {quantity:?} should empty the cart"
        );
        assert!(client.get("/cart/count").await.body.contains(">0<"));
    }
}

#[tokio::test]
async fn test_remove_is_idempotent() {
    let mut client = client();
    client.add("mug", "Mug", "10.00").await;
    client.add("tote", "Tote", "5.00").await;

    for _ in 0..2 {
        let resp = client
            .post_form("/cart/remove", "id=mug", Origin::Htmx("/cart"))
            .await;
        assert_eq!(resp.status, StatusCode::OK);
        assert!(!resp.body.contains("data-id=\"mug\""));
        assert!(resp.body.contains("data-id=\"tote\""));
    }
}

#[tokio::test]
async fn test_plain_remove_redirects_to_cart() {
    let mut client = client();
    client.add("mug", "Mug", "10.00").await;

    let resp = client.post_form("/cart/remove", "id=mug", Origin::Plain).await;
    assert_eq!(resp.status, StatusCode::SEE_OTHER);
    assert_eq!(resp.header("location"), Some("/cart"));
}

#[tokio::test]
async fn test_update_from_checkout_rerenders_summary() {
    let mut client = client();
    client.add("mug", "Mug", "10.00").await;

    let resp = client
        .post_form("/cart/update", "id=mug&quantity=2", Origin::Htmx("/checkout"))
        .await;
    assert!(resp.body.contains("id=\"order-summary\""));
    assert!(resp.body.contains("<dd id=\"total\">$25.00</dd>"));
}

// ============================================================================
// Checkout
// ============================================================================

#[tokio::test]
async fn test_checkout_empty_cart_shows_notice() {
    let mut client = client();

    let resp = client
        .post_form("/cart/checkout", "", Origin::Plain)
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.header("location").is_none());
    assert!(resp.body.contains("Your cart is empty!"));
    assert!(resp.body.contains("role=\"alertdialog\""));
    assert!(resp.body.contains("class=\"cart-count hidden\">0<"));
    assert!(client.get("/cart/count").await.body.contains(">0<"));
}

#[tokio::test]
async fn test_checkout_redirects_and_summarizes() {
    let mut client = client();
    client.add("a", "Ten", "10.00").await;
    client.add("a", "Ten", "10.00").await;
    client.add("b", "FiveFifty", "5.50").await;

    let resp = client
        .post_form("/cart/checkout", "", Origin::Plain)
        .await;
    assert_eq!(resp.status, StatusCode::SEE_OTHER);
    assert_eq!(resp.header("location"), Some("/checkout"));

    let resp = client.get("/checkout").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Qty: 2"));
    assert!(resp.body.contains("<dd id=\"subtotal\">$25.50</dd>"));
    assert!(resp.body.contains("<dd id=\"shipping\">$5.00</dd>"));
    assert!(resp.body.contains("<dd id=\"total\">$30.50</dd>"));
}

#[tokio::test]
async fn test_checkout_page_empty() {
    let mut client = client();
    let resp = client.get("/checkout").await;
    assert!(resp.body.contains("Your cart is empty"));
    assert!(resp.body.contains("<dd id=\"subtotal\">$0.00</dd>"));
    assert!(resp.body.contains("<dd id=\"total\">$0.00</dd>"));
}

// ============================================================================
// Session store failures
// ============================================================================

#[tokio::test]
async fn test_failed_save_keeps_previous_cart() {
    let store = FlakyStore::default();
    let mut client = TestClient::with_store(Catalog::default(), store.clone());
    client.add("mug", "Mug", "10.00").await;

    store.fail_saves(1);
    let resp = client.add("tote", "Tote", "5.00").await;
    assert_eq!(resp.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp.body, "Could not save your cart, please try again");

    let resp = client.get("/cart").await;
    assert!(resp.body.contains("data-id=\"mug\""));
    assert!(!resp.body.contains("data-id=\"tote\""));
    assert!(client.get("/cart/count").await.body.contains(">1<"));
}

#[tokio::test]
async fn test_failed_save_on_update_keeps_quantity() {
    let store = FlakyStore::default();
    let mut client = TestClient::with_store(Catalog::default(), store.clone());
    client.add("mug", "Mug", "10.00").await;

    store.fail_saves(1);
    let resp = client
        .post_form("/cart/update", "id=mug&quantity=7", Origin::Htmx("/cart"))
        .await;
    assert_eq!(resp.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(client.get("/cart/count").await.body.contains(">1<"));
}

#[tokio::test]
async fn test_unreadable_session_blocks_mutation() {
    let store = FlakyStore::default();
    let mut client = TestClient::with_store(Catalog::default(), store.clone());
    client.add("mug", "Mug", "10.00").await;

    store.fail_loads(1);
    let resp = client.add("tote", "Tote", "5.00").await;
    assert_eq!(resp.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp.body, "Could not save your cart, please try again");

    let resp = client.get("/cart").await;
    assert!(resp.body.contains("data-id=\"mug\""));
    assert!(!resp.body.contains("data-id=\"tote\""));
}

#[tokio::test]
async fn test_unreadable_session_renders_empty() {
    let store = FlakyStore::default();
    let mut client = TestClient::with_store(Catalog::default(), store.clone());
    client.add("mug", "Mug", "10.00").await;

    store.fail_loads(1);
    let resp = client.get("/cart/count").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains(">0<"));

    assert!(client.get("/cart/count").await.body.contains(">1<"));
}

// ============================================================================
// Sessions and ambient behaviour
// ============================================================================

#[tokio::test]
async fn test_carts_are_per_visitor() {
    let mut alice = client();
    alice.add("mug", "Mug", "10.00").await;

    let mut bob = alice.fresh_visitor();
    assert!(bob.get("/cart/count").await.body.contains(">0<"));
    assert!(alice.get("/cart/count").await.body.contains(">1<"));
}

#[tokio::test]
async fn test_home_lists_catalog() {
    let mut client = TestClient::new(sample_catalog());
    let resp = client.get("/").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body.matches("class=\"add-to-cart-btn\"").count(), 2);
    assert!(resp.body.contains("Stoneware Mug"));
    assert!(resp.body.contains("$22.50"));
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let mut client = client();
    let resp = client.get("/health").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body, "ok");
    assert!(resp.header("x-request-id").is_some());

    let resp = client.get("/health/ready").await;
    assert_eq!(resp.status, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let mut client = client();
    let resp = client.get("/products/mug").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.body, "Not found: /products/mug");
}

//! Menu loading, caching and order history.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use beachstall_client::menu::{Menu, PLACEHOLDER_IMAGE_URL, image_url};
use beachstall_client::orders::{OrdersError, order_history};
use beachstall_client::{AuthToken, MemoryTokenStore, Session, SessionStore, StallApi};
use beachstall_core::{OrderStatus, Price};
use beachstall_integration_tests::{FakeBackend, TOKEN, cart_item, product};
use serde_json::json;

#[tokio::test]
async fn test_menu_sections_from_server() {
    let backend = FakeBackend::start().await;
    backend.set_products(vec![
        product("p-1", "Prawn Biryani", 260.0, "Biryani"),
        product("p-2", "Fish Curry", 180.0, "Coastal Curries"),
        product("p-3", "Kerala Parotta", 30.0, "Main Course"),
        product("p-4", "Tender Coconut", 60.0, "Beverages"),
    ]);
    let api = backend.api();

    let menu = Menu::load(&api).await.unwrap();

    assert_eq!(menu.products().len(), 4);
    let sections = menu.sections();
    assert_eq!(sections[0].title, "Signature Biryanis");
    assert_eq!(sections[0].products.len(), 2);
    assert_eq!(sections[1].products[0].price, Price::rupees(180));
    assert_eq!(menu.by_category("Beverages").count(), 1);
}

#[tokio::test]
async fn test_products_are_cached() {
    let backend = FakeBackend::start().await;
    backend.set_products(vec![product("p-1", "Prawn Biryani", 260.0, "Biryani")]);
    let api = backend.api();

    api.products().await.unwrap();
    api.products().await.unwrap();
    assert_eq!(backend.requests("GET /product/getProducts"), 1);

    api.invalidate_products().await;
    api.products().await.unwrap();
    assert_eq!(backend.requests("GET /product/getProducts"), 2);
}

#[tokio::test]
async fn test_image_urls() {
    let backend = FakeBackend::start().await;
    let config = backend.config();

    assert_eq!(
        image_url(&config.asset_url, "uploads\\p-1.jpg"),
        "https://beachstall-server.vercel.app/uploads/p-1.jpg"
    );
    assert_eq!(image_url(&config.asset_url, ""), PLACEHOLDER_IMAGE_URL);
}

#[tokio::test]
async fn test_order_history_after_checkout() {
    let backend = FakeBackend::start().await;
    backend.set_cart(vec![cart_item("p-1", "Prawn Biryani", 260.0, 2)]);
    let api = Arc::new(backend.api());
    let mut sessions =
        SessionStore::new(api.clone(), MemoryTokenStore::with_token(AuthToken::new(TOKEN)));
    let session = sessions.check_session().await.clone();

    let placed: beachstall_core::NewOrder = serde_json::from_value(json!({
        "orderItems": [cart_item("p-1", "Prawn Biryani", 260.0, 2)],
        "shippingAddress": { "address": "12 Beach Road", "city": "Kochi", "phone": "98" },
        "totalPrice": 587.6,
        "paymentMethod": "CARD"
    }))
    .unwrap();
    api.create_order(session.token().unwrap(), &placed).await.unwrap();

    let orders = order_history(api.as_ref(), &session).await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].status, OrderStatus::Pending);
    assert_eq!(orders[0].item_count(), 2);
    assert_eq!(orders[0].payment_method, "CARD");
    assert!(orders[0].created_at.is_some());
}

#[tokio::test]
async fn test_order_history_requires_login() {
    let backend = FakeBackend::start().await;
    let api = backend.api();

    let err = order_history(&api, &Session::Anonymous).await.unwrap_err();

    assert!(matches!(err, OrdersError::LoginRequired));
    assert_eq!(backend.total_requests(), 0);
}

//! Session restore, login and logout against the fake backend.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use beachstall_client::{
    AuthError, AuthToken, HttpApi, MemoryTokenStore, SessionStore, Storefront, TokenStore,
};
use beachstall_core::{Email, UserRole};
use beachstall_integration_tests::{EMAIL, FakeBackend, PASSWORD, TOKEN, cart_item};
use secrecy::SecretString;

fn storefront(
    backend: &FakeBackend,
    tokens: MemoryTokenStore,
) -> Storefront<HttpApi, MemoryTokenStore> {
    let config = backend.config();
    Storefront::new(Arc::new(backend.api()), tokens, config.asset_url)
}

#[tokio::test]
async fn test_fresh_start_is_anonymous_and_silent() {
    let backend = FakeBackend::start().await;
    let mut app = storefront(&backend, MemoryTokenStore::new());

    assert!(!app.start().await.is_authenticated());
    assert!(app.cart().is_empty());
    assert_eq!(backend.total_requests(), 0);
}

#[tokio::test]
async fn test_stored_token_restores_session_then_cart() {
    let backend = FakeBackend::start().await;
    backend.set_cart(vec![cart_item("p-1", "Prawn Biryani", 260.0, 2)]);
    let mut app = storefront(&backend, MemoryTokenStore::with_token(AuthToken::new(TOKEN)));

    let session = app.start().await;
    let user = session.user().unwrap();
    assert_eq!(user.name, "Asha");
    assert_eq!(user.role, UserRole::User);
    assert_eq!(user.email.as_ref().map(Email::as_str), Some(EMAIL));

    assert_eq!(app.cart().item_count(), 2);
    assert_eq!(backend.requests("GET /auth/me"), 1);
    assert_eq!(backend.requests("GET /cart"), 1);
}

#[tokio::test]
async fn test_unlisted_role_keeps_session() {
    let backend = FakeBackend::start().await;
    backend.set_role("customer");
    let tokens = MemoryTokenStore::with_token(AuthToken::new(TOKEN));
    let mut app = storefront(&backend, tokens);

    let session = app.start().await;
    assert!(session.is_authenticated());
    assert_eq!(
        session.user().unwrap().role,
        UserRole::Other("customer".to_string())
    );
    assert_eq!(backend.requests("GET /cart"), 1);
}

#[tokio::test]
async fn test_rejected_token_is_cleared_and_cart_not_fetched() {
    let backend = FakeBackend::start().await;
    let tokens = MemoryTokenStore::with_token(AuthToken::new("expired-jwt"));
    let mut app = storefront(&backend, tokens);

    assert!(!app.start().await.is_authenticated());
    assert_eq!(backend.requests("GET /auth/me"), 1);
    assert_eq!(backend.requests("GET /cart"), 0);

    // A second start has nothing to validate
    assert!(!app.start().await.is_authenticated());
    assert_eq!(backend.requests("GET /auth/me"), 1);
}

#[tokio::test]
async fn test_server_error_on_me_also_logs_out() {
    let backend = FakeBackend::start().await;
    backend.fail("GET /auth/me", 500, Some("database unavailable"));
    let mut app = storefront(&backend, MemoryTokenStore::with_token(AuthToken::new(TOKEN)));

    assert!(!app.start().await.is_authenticated());
}

#[tokio::test]
async fn test_login_persists_token_and_loads_cart() {
    let backend = FakeBackend::start().await;
    backend.set_cart(vec![cart_item("p-2", "Fish Curry", 180.0, 1)]);
    let mut app = storefront(&backend, MemoryTokenStore::new());
    app.start().await;

    app.login(&Email::parse(EMAIL).unwrap(), SecretString::from(PASSWORD))
        .await
        .unwrap();

    assert!(app.session().is_authenticated());
    assert_eq!(app.cart().item_count(), 1);
    assert_eq!(backend.requests("POST /auth/login"), 1);
    assert_eq!(backend.requests("GET /auth/me"), 1);
}

#[tokio::test]
async fn test_bad_credentials_show_server_message() {
    let backend = FakeBackend::start().await;
    let mut app = storefront(&backend, MemoryTokenStore::new());

    let err = app
        .login(&Email::parse(EMAIL).unwrap(), SecretString::from("nope"))
        .await
        .unwrap_err();

    assert!(matches!(&err, AuthError::LoginFailed(m) if m == "Invalid credentials"));
    assert!(!app.session().is_authenticated());
    assert_eq!(backend.requests("GET /auth/me"), 0);
}

#[tokio::test]
async fn test_login_server_error_collapses_to_one_message() {
    let backend = FakeBackend::start().await;
    backend.fail("POST /auth/login", 502, None);
    let mut app = storefront(&backend, MemoryTokenStore::new());

    let err = app
        .login(&Email::parse(EMAIL).unwrap(), SecretString::from(PASSWORD))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Invalid email or password");
}

#[tokio::test]
async fn test_logout_is_local() {
    let backend = FakeBackend::start().await;
    backend.set_cart(vec![cart_item("p-1", "Prawn Biryani", 260.0, 1)]);
    let tokens = MemoryTokenStore::with_token(AuthToken::new(TOKEN));
    let mut app = storefront(&backend, tokens);
    app.start().await;
    let before = backend.total_requests();

    app.logout().unwrap();

    assert!(!app.session().is_authenticated());
    assert!(app.cart().is_empty());
    assert_eq!(backend.total_requests(), before);
    assert_eq!(backend.cart().len(), 1);
}

#[tokio::test]
async fn test_token_store_is_cleared_on_rejection() {
    let backend = FakeBackend::start().await;
    let tokens = MemoryTokenStore::with_token(AuthToken::new("expired-jwt"));
    let mut store = SessionStore::new(Arc::new(backend.api()), tokens);

    store.check_session().await;

    assert!(store.token_store().load().unwrap().is_none());
}
